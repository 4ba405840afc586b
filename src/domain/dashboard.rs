// Dashboard persistence shapes - the collaborator contract
use serde::{Deserialize, Serialize};

/// A persisted dashboard as returned by the store. The engine keeps a
/// working copy and never reads the persisted record back except on
/// initial load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardDefinition {
    pub id: String,
    pub name: String,
    pub sensor_ids: Vec<String>,
    pub business_id: String,
    #[serde(default)]
    pub is_admin_only: bool,
}

/// Payload for creating a new dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDashboard {
    pub name: String,
    pub sensor_ids: Vec<String>,
    pub business_id: String,
    pub is_admin_only: bool,
}

/// Partial update; only the changed fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_ids: Option<Vec<String>>,
}

impl DashboardPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.sensor_ids.is_none()
    }
}
