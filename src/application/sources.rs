// Source traits for the external collaborators
use crate::domain::dashboard::{DashboardDefinition, DashboardPatch, NewDashboard};
use crate::domain::identity::SensorIdentity;
use crate::domain::reading::Reading;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A sensor row as the catalogue backend returns it. Field names follow
/// the transport payload; identity resolution happens in
/// [`resolve_identities`], nothing downstream touches these raw shapes.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogueSensor {
    pub id: i64,
    pub sensor_id: Option<String>,
    pub sensor_type_name: String,
    pub sensor_name: Option<String>,
    pub location_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
}

#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Reading history for a single sensor.
    async fn readings_by_sensor(&self, sensor_id: &str) -> anyhow::Result<Vec<Reading>>;

    /// Enriched readings across all sensors, facility and type already
    /// joined in.
    async fn all_readings(&self) -> anyhow::Result<Vec<Reading>>;
}

#[async_trait]
pub trait CatalogueSource: Send + Sync {
    async fn sensors(&self) -> anyhow::Result<Vec<CatalogueSensor>>;
    async fn locations(&self) -> anyhow::Result<Vec<Location>>;
}

#[async_trait]
pub trait DashboardStore: Send + Sync {
    async fn get_dashboard(&self, id: &str) -> anyhow::Result<DashboardDefinition>;
    async fn create_dashboard(&self, def: &NewDashboard) -> anyhow::Result<DashboardDefinition>;
    async fn update_dashboard(&self, id: &str, patch: &DashboardPatch) -> anyhow::Result<()>;
    async fn list_user_dashboards(&self) -> anyhow::Result<Vec<DashboardDefinition>>;
    async fn delete_dashboard(&self, id: &str) -> anyhow::Result<()>;
}

/// Join catalogue sensors with their locations into canonical sensor
/// identities. A sensor whose location is unknown gets facility
/// "Unknown"; the display name falls back to the numeric catalogue id.
pub fn resolve_identities(
    sensors: &[CatalogueSensor],
    locations: &[Location],
) -> Vec<SensorIdentity> {
    sensors
        .iter()
        .map(|s| {
            let facility = s
                .location_id
                .and_then(|lid| locations.iter().find(|l| l.id == lid))
                .map(|l| l.name.clone())
                .unwrap_or_else(|| "Unknown".to_string());
            let sensor_id = s.sensor_id.clone().unwrap_or_else(|| s.id.to_string());
            let display_name = s.sensor_name.clone().or_else(|| Some(s.id.to_string()));
            SensorIdentity {
                facility,
                sensor_id,
                sensor_type: s.sensor_type_name.clone(),
                display_name,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor(id: i64, sensor_id: Option<&str>, location_id: Option<i64>) -> CatalogueSensor {
        CatalogueSensor {
            id,
            sensor_id: sensor_id.map(str::to_string),
            sensor_type_name: "temperature".into(),
            sensor_name: Some("walk-in".into()),
            location_id,
        }
    }

    #[test]
    fn test_resolve_joins_location_name() {
        let locations = vec![Location {
            id: 1,
            name: "Burger Barn".into(),
        }];
        let identities = resolve_identities(&[sensor(2, Some("sensor-abc"), Some(1))], &locations);
        assert_eq!(identities[0].facility, "Burger Barn");
        assert_eq!(identities[0].sensor_id, "sensor-abc");
    }

    #[test]
    fn test_missing_location_falls_back_to_unknown() {
        let identities = resolve_identities(&[sensor(2, Some("sensor-abc"), Some(9))], &[]);
        assert_eq!(identities[0].facility, "Unknown");
    }

    #[test]
    fn test_missing_sensor_id_uses_catalogue_id() {
        let identities = resolve_identities(&[sensor(42, None, None)], &[]);
        assert_eq!(identities[0].sensor_id, "42");
    }
}
