// Sensor identity - canonical naming for a monitored signal
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Canonicalize a free-text identity field so matching survives
/// whitespace, casing and unicode variation coming from different
/// catalogue sources. Idempotent; `None` maps to the empty string.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.nfkc() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        for lower in c.to_lowercase() {
            out.push(lower);
        }
    }
    out
}

/// The `(facility, sensor_id, type)` triple naming one monitored signal,
/// built at the catalogue boundary. All internal comparisons go through
/// the normalized key, never through raw transport payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorIdentity {
    pub facility: String,
    pub sensor_id: String,
    pub sensor_type: String,
    pub display_name: Option<String>,
}

/// Normalized triple used as the comparison and config key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey {
    pub facility: String,
    pub sensor_id: String,
    pub sensor_type: String,
}

impl SensorIdentity {
    pub fn new(facility: String, sensor_id: String, sensor_type: String) -> Self {
        Self {
            facility,
            sensor_id,
            sensor_type,
            display_name: None,
        }
    }

    pub fn key(&self) -> IdentityKey {
        IdentityKey {
            facility: normalize(&self.facility),
            sensor_id: normalize(&self.sensor_id),
            sensor_type: normalize(&self.sensor_type),
        }
    }

    pub fn same_sensor(&self, other: &SensorIdentity) -> bool {
        self.key() == other.key()
    }

    /// Label used in widget headers, e.g. "Burger Barn – walk-in (temperature)".
    pub fn label(&self) -> String {
        let name = self.display_name.as_deref().unwrap_or(&self.sensor_id);
        format!("{} – {} ({})", self.facility, name, self.sensor_type)
    }
}
