// Domain layer - Pure engine logic, no I/O
pub mod alert;
pub mod dashboard;
pub mod identity;
pub mod reading;
pub mod runtime;
pub mod time_window;
pub mod widget;
