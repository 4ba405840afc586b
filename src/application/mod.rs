// Application layer - Use cases over the collaborator traits
pub mod catalogue_service;
pub mod dashboard_service;
pub mod sources;
pub mod widget_service;
