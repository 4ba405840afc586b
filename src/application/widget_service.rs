// Widget service - Use case for building the dashboard view
use crate::application::dashboard_service::{
    AuthContext, DashboardReconciler, EngineError,
};
use crate::application::sources::{CatalogueSource, DashboardStore, ReadingSource};
use crate::domain::time_window::TimeRange;
use crate::domain::widget::{build_widget, TemperatureUnit, WidgetView};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

/// The rendered form of one dashboard: a widget per selected sensor,
/// plus the sticky load-error flag for the banner.
#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub name: String,
    pub load_error: bool,
    pub widgets: Vec<WidgetView>,
}

/// Option lists for an ad-hoc (unsaved) session, derived from the
/// enriched reading pool.
#[derive(Debug, Serialize)]
pub struct ExploreOptions {
    pub facilities: Vec<String>,
    pub sensor_types: Vec<String>,
}

#[derive(Clone)]
pub struct WidgetService {
    readings: Arc<dyn ReadingSource>,
    catalogue: Arc<dyn CatalogueSource>,
    store: Arc<dyn DashboardStore>,
}

impl WidgetService {
    pub fn new(
        readings: Arc<dyn ReadingSource>,
        catalogue: Arc<dyn CatalogueSource>,
        store: Arc<dyn DashboardStore>,
    ) -> Self {
        Self {
            readings,
            catalogue,
            store,
        }
    }

    /// Load a saved dashboard and derive a widget per selected sensor.
    pub async fn dashboard_view(
        &self,
        auth: AuthContext,
        dashboard_id: &str,
        range: &TimeRange,
        unit: TemperatureUnit,
    ) -> Result<DashboardView, EngineError> {
        let mut reconciler = DashboardReconciler::new(
            self.readings.clone(),
            self.catalogue.clone(),
            self.store.clone(),
            auth,
        );
        reconciler.load(dashboard_id).await?;
        Ok(DashboardView {
            name: reconciler.dashboard_name().to_string(),
            load_error: reconciler.load_error(),
            widgets: widgets_for(&reconciler, range, unit),
        })
    }

    /// Facility and sensor-type option lists for a blank session,
    /// seeded from the enriched reading pool.
    pub async fn explore_options(&self) -> anyhow::Result<ExploreOptions> {
        let pool = self.readings.all_readings().await?;
        let mut facilities: Vec<String> = pool.iter().map(|r| r.facility.clone()).collect();
        facilities.sort();
        facilities.dedup();
        let mut sensor_types: Vec<String> = pool.iter().map(|r| r.sensor_type.clone()).collect();
        sensor_types.sort();
        sensor_types.dedup();
        Ok(ExploreOptions {
            facilities,
            sensor_types,
        })
    }
}

/// Derive the widget view-models for a reconciler's current working
/// set. Pure over the reconciler state; called per render.
pub fn widgets_for(
    reconciler: &DashboardReconciler,
    range: &TimeRange,
    unit: TemperatureUnit,
) -> Vec<WidgetView> {
    let now = Utc::now();
    reconciler
        .selected_sensors()
        .iter()
        .map(|identity| {
            let config = reconciler.alert_config(&identity.key());
            build_widget(reconciler.raw_pool(), identity, range, &config, unit, now)
        })
        .collect()
}
