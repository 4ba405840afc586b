// HTTP request handlers
use crate::application::dashboard_service::{AuthContext, EngineError};
use crate::domain::time_window::TimeRange;
use crate::domain::widget::TemperatureUnit;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct ViewQuery {
    pub range: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub applied: Option<bool>,
    pub unit: Option<String>,
}

impl ViewQuery {
    fn time_range(&self) -> TimeRange {
        match self.range.as_deref() {
            Some("1h") => TimeRange::LastHour,
            Some("1d") => TimeRange::LastDay,
            Some("all") => TimeRange::All,
            Some("custom") => TimeRange::Custom {
                start: self.start.clone(),
                end: self.end.clone(),
                applied: self.applied.unwrap_or(false),
            },
            _ => TimeRange::LastWeek,
        }
    }

    fn temperature_unit(&self) -> TemperatureUnit {
        match self.unit.as_deref() {
            Some("f") | Some("F") => TemperatureUnit::Fahrenheit,
            _ => TemperatureUnit::Celsius,
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List catalogue sensors as canonical identities
pub async fn list_sensors(State(state): State<Arc<AppState>>) -> Response {
    match state.catalogue_service.list_identities().await {
        Ok(identities) => Json(identities).into_response(),
        Err(e) => {
            tracing::error!("Error fetching sensor catalogue: {:#}", e);
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

/// List facility locations
pub async fn list_locations(State(state): State<Arc<AppState>>) -> Response {
    match state.catalogue_service.list_locations().await {
        Ok(locations) => Json(locations).into_response(),
        Err(e) => {
            tracing::error!("Error fetching locations: {:#}", e);
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

/// List the caller's saved dashboards
pub async fn list_dashboards(State(state): State<Arc<AppState>>) -> Response {
    match state.dashboard_store.list_user_dashboards().await {
        Ok(dashboards) => Json(dashboards).into_response(),
        Err(e) => {
            tracing::error!("Error listing dashboards: {:#}", e);
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

/// Delete a saved dashboard; the store owns the actual removal
pub async fn delete_dashboard(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.dashboard_store.delete_dashboard(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::error!("Error deleting dashboard {}: {:#}", id, e);
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

/// Facility and sensor-type options for a blank dashboard session
pub async fn explore_options(State(state): State<Arc<AppState>>) -> Response {
    match state.widget_service.explore_options().await {
        Ok(options) => Json(options).into_response(),
        Err(e) => {
            tracing::error!("Error building explore options: {:#}", e);
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

/// Render a saved dashboard: one widget view-model per selected sensor
pub async fn dashboard_view(
    Path(id): Path<String>,
    Query(query): Query<ViewQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let auth = auth_from_headers(&headers, &state.business_id);
    let range = query.time_range();
    let unit = query.temperature_unit();

    match state
        .widget_service
        .dashboard_view(auth, &id, &range, unit)
        .await
    {
        Ok(view) => Json(view).into_response(),
        Err(e) => engine_error_response(&id, e),
    }
}

fn engine_error_response(id: &str, e: EngineError) -> Response {
    match e {
        EngineError::NotAuthenticated => StatusCode::UNAUTHORIZED.into_response(),
        EngineError::Validation(message) => {
            (StatusCode::UNPROCESSABLE_ENTITY, message).into_response()
        }
        EngineError::Fetch(source) => {
            tracing::error!("Error building dashboard {}: {:#}", id, source);
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

/// The auth collaborator is external; at this surface a bearer token's
/// presence is what gates dashboard operations.
fn auth_from_headers(headers: &HeaderMap, business_id: &str) -> AuthContext {
    let authenticated = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_ascii_lowercase().starts_with("bearer "))
        .unwrap_or(false);
    AuthContext {
        authenticated,
        business_id: business_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::catalogue_service::CatalogueService;
    use crate::application::sources::{
        CatalogueSensor, CatalogueSource, DashboardStore, Location, ReadingSource,
    };
    use crate::application::widget_service::WidgetService;
    use crate::domain::dashboard::{DashboardDefinition, DashboardPatch, NewDashboard};
    use crate::domain::reading::Reading;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubBackend {
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ReadingSource for StubBackend {
        async fn readings_by_sensor(&self, _sensor_id: &str) -> anyhow::Result<Vec<Reading>> {
            Ok(Vec::new())
        }

        async fn all_readings(&self) -> anyhow::Result<Vec<Reading>> {
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl CatalogueSource for StubBackend {
        async fn sensors(&self) -> anyhow::Result<Vec<CatalogueSensor>> {
            Ok(Vec::new())
        }

        async fn locations(&self) -> anyhow::Result<Vec<Location>> {
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl DashboardStore for StubBackend {
        async fn get_dashboard(&self, id: &str) -> anyhow::Result<DashboardDefinition> {
            anyhow::bail!("dashboard {} not found", id)
        }

        async fn create_dashboard(&self, _def: &NewDashboard) -> anyhow::Result<DashboardDefinition> {
            anyhow::bail!("unsupported")
        }

        async fn update_dashboard(&self, _id: &str, _patch: &DashboardPatch) -> anyhow::Result<()> {
            anyhow::bail!("unsupported")
        }

        async fn list_user_dashboards(&self) -> anyhow::Result<Vec<DashboardDefinition>> {
            Ok(Vec::new())
        }

        async fn delete_dashboard(&self, id: &str) -> anyhow::Result<()> {
            self.deleted.lock().unwrap().push(id.to_string());
            Ok(())
        }
    }

    fn state_with(backend: Arc<StubBackend>) -> Arc<AppState> {
        Arc::new(AppState {
            catalogue_service: CatalogueService::new(backend.clone()),
            widget_service: WidgetService::new(backend.clone(), backend.clone(), backend.clone()),
            dashboard_store: backend,
            business_id: "biz-1".into(),
        })
    }

    #[tokio::test]
    async fn test_delete_dashboard_forwards_to_store() {
        let backend = Arc::new(StubBackend::default());
        let state = state_with(backend.clone());

        let response = delete_dashboard(Path("dash-1".into()), State(state)).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(backend.deleted.lock().unwrap().as_slice(), ["dash-1"]);
    }

    #[test]
    fn test_time_range_parsing() {
        let q = ViewQuery {
            range: Some("1h".into()),
            start: None,
            end: None,
            applied: None,
            unit: None,
        };
        assert!(matches!(q.time_range(), TimeRange::LastHour));

        let q = ViewQuery {
            range: Some("custom".into()),
            start: Some("2024-05-20T10:00:00Z".into()),
            end: Some("2024-05-20T12:00:00Z".into()),
            applied: Some(true),
            unit: Some("f".into()),
        };
        assert!(matches!(
            q.time_range(),
            TimeRange::Custom { applied: true, .. }
        ));
        assert_eq!(q.temperature_unit(), TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn test_unknown_range_defaults_to_week() {
        let q = ViewQuery {
            range: Some("2w".into()),
            start: None,
            end: None,
            applied: None,
            unit: None,
        };
        assert!(matches!(q.time_range(), TimeRange::LastWeek));
    }
}
