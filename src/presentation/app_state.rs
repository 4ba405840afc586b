// Application state for HTTP handlers
use crate::application::catalogue_service::CatalogueService;
use crate::application::sources::DashboardStore;
use crate::application::widget_service::WidgetService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub catalogue_service: CatalogueService,
    pub widget_service: WidgetService,
    pub dashboard_store: Arc<dyn DashboardStore>,
    pub business_id: String,
}
