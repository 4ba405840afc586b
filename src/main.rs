// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::application::catalogue_service::CatalogueService;
use crate::application::widget_service::WidgetService;
use crate::infrastructure::config::load_api_config;
use crate::infrastructure::http_api::FacilityApi;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    dashboard_view, delete_dashboard, explore_options, health_check, list_dashboards,
    list_locations, list_sensors,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "facility_telemetry=info,tower_http=info".into()),
        )
        .init();

    // Load configuration
    let api_config = load_api_config()?;

    // Create backend adapter (infrastructure layer)
    let api = Arc::new(FacilityApi::new(
        api_config.api.base_url,
        api_config.api.token,
        api_config.api.reading_limit,
    ));

    // Create services (application layer)
    let catalogue_service = CatalogueService::new(api.clone());
    let widget_service = WidgetService::new(api.clone(), api.clone(), api.clone());

    // Create application state
    let state = Arc::new(AppState {
        catalogue_service,
        widget_service,
        dashboard_store: api,
        business_id: api_config.api.business_id,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/sensors", get(list_sensors))
        .route("/locations", get(list_locations))
        .route("/dashboards", get(list_dashboards))
        .route("/dashboards/:id", delete(delete_dashboard))
        .route("/dashboards/:id/view", get(dashboard_view))
        .route("/explore", get(explore_options))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = "0.0.0.0:8080".parse()?;
    tracing::info!("Starting facility-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
