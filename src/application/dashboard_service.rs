// Dashboard reconciler - the mutable working set behind one dashboard
// editing session
use crate::application::sources::{
    resolve_identities, CatalogueSource, DashboardStore, ReadingSource,
};
use crate::domain::alert::{AlertConfig, AlertConfigEdit};
use crate::domain::dashboard::{DashboardPatch, NewDashboard};
use crate::domain::identity::{normalize, IdentityKey, SensorIdentity};
use crate::domain::reading::Reading;
use futures::future::join_all;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("{0}")]
    Validation(String),
    #[error("fetch failed: {0}")]
    Fetch(anyhow::Error),
}

/// Session context handed in by the caller; the engine gates dashboard
/// operations on it but does not implement authentication itself.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub authenticated: bool,
    pub business_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkingState {
    Empty,
    Loaded,
    Dirty,
    Saved,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    /// Name matches the persisted one, nothing to do.
    Unchanged,
    /// No persisted dashboard yet; the edit stays local until save.
    LocalOnly,
    /// User declined the confirmation; the local edit is kept as-is.
    DeclinedKeptLocal,
    /// Persisted name updated.
    Renamed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Type,
    Location,
    LatestValueDesc,
}

/// Owns the in-memory working copy of a dashboard: the selected
/// sensors, their alert configs, the raw reading pool and the name
/// edits. Diverges from the persisted record until an explicit save or
/// update; the persisted copy is never read back except on load.
pub struct DashboardReconciler {
    readings: Arc<dyn ReadingSource>,
    catalogue: Arc<dyn CatalogueSource>,
    store: Arc<dyn DashboardStore>,
    auth: AuthContext,
    raw_pool: Vec<Reading>,
    selected: Vec<SensorIdentity>,
    alert_configs: HashMap<IdentityKey, AlertConfig>,
    dashboard_id: Option<String>,
    dashboard_name: String,
    original_name: String,
    persisted_sensor_ids: Vec<String>,
    load_error: bool,
    state: WorkingState,
}

impl DashboardReconciler {
    pub fn new(
        readings: Arc<dyn ReadingSource>,
        catalogue: Arc<dyn CatalogueSource>,
        store: Arc<dyn DashboardStore>,
        auth: AuthContext,
    ) -> Self {
        Self {
            readings,
            catalogue,
            store,
            auth,
            raw_pool: Vec::new(),
            selected: Vec::new(),
            alert_configs: HashMap::new(),
            dashboard_id: None,
            dashboard_name: String::new(),
            original_name: String::new(),
            persisted_sensor_ids: Vec::new(),
            load_error: false,
            state: WorkingState::Empty,
        }
    }

    pub fn selected_sensors(&self) -> &[SensorIdentity] {
        &self.selected
    }

    pub fn raw_pool(&self) -> &[Reading] {
        &self.raw_pool
    }

    pub fn alert_config(&self, key: &IdentityKey) -> AlertConfig {
        self.alert_configs.get(key).cloned().unwrap_or_default()
    }

    pub fn dashboard_id(&self) -> Option<&str> {
        self.dashboard_id.as_deref()
    }

    pub fn dashboard_name(&self) -> &str {
        &self.dashboard_name
    }

    pub fn load_error(&self) -> bool {
        self.load_error
    }

    pub fn state(&self) -> WorkingState {
        self.state
    }

    fn require_auth(&self) -> Result<(), EngineError> {
        if self.auth.authenticated {
            Ok(())
        } else {
            Err(EngineError::NotAuthenticated)
        }
    }

    /// Hydrate the working set from a persisted dashboard. Sensor ids
    /// absent from the current catalogue are dropped silently; reading
    /// history for the survivors is fetched concurrently, one failed
    /// fetch contributing an empty result without aborting the rest.
    pub async fn load(&mut self, dashboard_id: &str) -> Result<(), EngineError> {
        self.require_auth()?;

        let fetched = self.store.get_dashboard(dashboard_id).await;
        let definition = fetched.map_err(|e| self.fetch_failed(e))?;
        let fetched = self.catalogue.sensors().await;
        let sensors = fetched.map_err(|e| self.fetch_failed(e))?;
        let fetched = self.catalogue.locations().await;
        let locations = fetched.map_err(|e| self.fetch_failed(e))?;
        let catalogue = resolve_identities(&sensors, &locations);

        let mut selected = Vec::new();
        for sensor_id in &definition.sensor_ids {
            let wanted = normalize(sensor_id);
            match catalogue
                .iter()
                .find(|identity| normalize(&identity.sensor_id) == wanted)
            {
                Some(identity) => selected.push(identity.clone()),
                None => {
                    tracing::warn!(
                        "Dropping sensor {} from dashboard {}: not in catalogue",
                        sensor_id,
                        dashboard_id
                    );
                }
            }
        }

        let fetches = selected.iter().map(|identity| {
            let readings = self.readings.clone();
            let identity = identity.clone();
            async move {
                match readings.readings_by_sensor(&identity.sensor_id).await {
                    Ok(history) => (tag_readings(history, &identity), false),
                    Err(e) => {
                        tracing::error!(
                            "Failed to load readings for {}: {:#}",
                            identity.sensor_id,
                            e
                        );
                        (Vec::new(), true)
                    }
                }
            }
        });

        let mut pool = Vec::new();
        let mut any_failed = false;
        for (history, failed) in join_all(fetches).await {
            pool.extend(history);
            any_failed |= failed;
        }

        self.raw_pool = pool;
        self.selected = selected;
        self.dashboard_id = Some(definition.id.clone());
        self.dashboard_name = definition.name.clone();
        self.original_name = definition.name;
        self.persisted_sensor_ids = definition.sensor_ids;
        self.load_error = any_failed;
        self.state = WorkingState::Loaded;
        Ok(())
    }

    /// Add a sensor to the working set, fetching its history eagerly.
    /// A failed fetch surfaces as a sticky load error and leaves the
    /// previously loaded sensors untouched.
    pub async fn add_sensor(&mut self, identity: SensorIdentity) -> Result<(), EngineError> {
        self.require_auth()?;

        let fetched = self.readings.readings_by_sensor(&identity.sensor_id).await;
        let history = fetched.map_err(|e| self.fetch_failed(e))?;

        self.load_error = false;
        self.raw_pool.extend(tag_readings(history, &identity));
        self.selected.push(identity);
        self.state = WorkingState::Dirty;
        Ok(())
    }

    /// Drop a sensor from view. Its alert config and readings stay in
    /// memory; removal is a view-level filter, not a data purge.
    pub fn remove_sensor(&mut self, identity: &SensorIdentity) {
        let key = identity.key();
        self.selected.retain(|s| s.key() != key);
        self.state = WorkingState::Dirty;
    }

    /// Shallow-merge a config edit; fields the edit does not mention
    /// survive.
    pub fn update_alert_config(&mut self, key: IdentityKey, edit: AlertConfigEdit) {
        self.alert_configs.entry(key).or_default().merge(edit);
        self.state = WorkingState::Dirty;
    }

    /// Local name edit; nothing is persisted until the edit is
    /// committed.
    pub fn rename(&mut self, name: &str) {
        self.dashboard_name = name.to_string();
        self.state = WorkingState::Dirty;
    }

    /// Commit a pending name edit. Renaming an existing dashboard needs
    /// explicit confirmation; a declined confirmation keeps the local
    /// edit in place rather than reverting it.
    pub async fn commit_rename(&mut self, confirmed: bool) -> Result<RenameOutcome, EngineError> {
        if self.dashboard_name == self.original_name {
            return Ok(RenameOutcome::Unchanged);
        }
        let Some(id) = self.dashboard_id.clone() else {
            return Ok(RenameOutcome::LocalOnly);
        };
        if !confirmed {
            return Ok(RenameOutcome::DeclinedKeptLocal);
        }

        let patch = DashboardPatch {
            name: Some(self.dashboard_name.clone()),
            sensor_ids: None,
        };
        let sent = self.store.update_dashboard(&id, &patch).await;
        sent.map_err(|e| self.fetch_failed(e))?;
        self.original_name = self.dashboard_name.clone();
        Ok(RenameOutcome::Renamed)
    }

    /// Persist the working set as a new dashboard. Validation runs
    /// before any network call; the current dashboard context is not
    /// switched to the new record.
    pub async fn save_as_new(&mut self, name: &str) -> Result<String, EngineError> {
        self.require_auth()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::Validation(
                "Dashboard name must not be empty".into(),
            ));
        }
        if self.selected.is_empty() {
            return Err(EngineError::Validation(
                "Select at least one sensor before saving".into(),
            ));
        }

        let def = NewDashboard {
            name: name.to_string(),
            sensor_ids: self.selected_sensor_ids(),
            business_id: self.auth.business_id.clone(),
            is_admin_only: false,
        };
        let sent = self.store.create_dashboard(&def).await;
        let created = sent.map_err(|e| self.fetch_failed(e))?;
        self.state = WorkingState::Saved;
        Ok(created.id)
    }

    /// Push the working set into the existing persisted record, sending
    /// only the fields that changed since load.
    pub async fn update_existing(&mut self) -> Result<(), EngineError> {
        self.require_auth()?;
        let Some(id) = self.dashboard_id.clone() else {
            return Err(EngineError::Validation(
                "No dashboard loaded to update".into(),
            ));
        };
        if self.dashboard_name.trim().is_empty() {
            return Err(EngineError::Validation(
                "Dashboard name must not be empty".into(),
            ));
        }
        if self.selected.is_empty() {
            return Err(EngineError::Validation(
                "Select at least one sensor before updating".into(),
            ));
        }

        let sensor_ids = self.selected_sensor_ids();
        let patch = DashboardPatch {
            name: (self.dashboard_name != self.original_name)
                .then(|| self.dashboard_name.clone()),
            sensor_ids: (sensor_ids != self.persisted_sensor_ids).then_some(sensor_ids),
        };
        if patch.is_empty() {
            return Ok(());
        }

        let sent = self.store.update_dashboard(&id, &patch).await;
        sent.map_err(|e| self.fetch_failed(e))?;
        self.original_name = self.dashboard_name.clone();
        if let Some(ids) = patch.sensor_ids {
            self.persisted_sensor_ids = ids;
        }
        self.state = WorkingState::Updated;
        Ok(())
    }

    /// Read-side projection: the selected sensors in the requested
    /// order. Never reorders `selected` itself.
    pub fn sorted_sensors(&self, key: SortKey) -> Vec<SensorIdentity> {
        let mut sensors = self.selected.clone();
        match key {
            SortKey::Name => {
                sensors.sort_by_key(|s| normalize(s.display_name.as_deref().unwrap_or(&s.sensor_id)))
            }
            SortKey::Type => sensors.sort_by_key(|s| normalize(&s.sensor_type)),
            SortKey::Location => sensors.sort_by_key(|s| normalize(&s.facility)),
            SortKey::LatestValueDesc => {
                sensors.sort_by(|a, b| {
                    let va = self.latest_value(a).unwrap_or(f64::NEG_INFINITY);
                    let vb = self.latest_value(b).unwrap_or(f64::NEG_INFINITY);
                    vb.total_cmp(&va)
                });
            }
        }
        sensors
    }

    /// Read-side projection: selected sensors grouped by normalized
    /// type, insertion order preserved within a group.
    pub fn grouped_by_type(&self) -> BTreeMap<String, Vec<SensorIdentity>> {
        let mut groups: BTreeMap<String, Vec<SensorIdentity>> = BTreeMap::new();
        for sensor in &self.selected {
            groups
                .entry(normalize(&sensor.sensor_type))
                .or_default()
                .push(sensor.clone());
        }
        groups
    }

    fn latest_value(&self, identity: &SensorIdentity) -> Option<f64> {
        let key = identity.key();
        self.raw_pool
            .iter()
            .filter(|r| r.key() == key)
            .max_by_key(|r| r.timestamp)
            .map(|r| r.value)
    }

    fn selected_sensor_ids(&self) -> Vec<String> {
        self.selected.iter().map(|s| s.sensor_id.clone()).collect()
    }

    fn fetch_failed(&mut self, e: anyhow::Error) -> EngineError {
        self.load_error = true;
        EngineError::Fetch(e)
    }
}

/// Per-sensor history endpoints return bare readings; stamp them with
/// the owning identity so pool filtering sees a complete triple.
fn tag_readings(history: Vec<Reading>, identity: &SensorIdentity) -> Vec<Reading> {
    history
        .into_iter()
        .map(|mut r| {
            r.facility = identity.facility.clone();
            r.sensor_type = identity.sensor_type.clone();
            r
        })
        .collect()
}
