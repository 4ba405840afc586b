// Raw readings and the pure projections over them
use crate::domain::identity::{normalize, IdentityKey, SensorIdentity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One timestamped scalar observation, as delivered by the reading
/// source. Immutable once received; derived views are annotated copies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    #[serde(deserialize_with = "string_or_number")]
    pub sensor_id: String,
    /// Per-sensor history endpoints omit these two; the reconciler tags
    /// them from the owning identity before the pool merge.
    #[serde(default)]
    pub facility: String,
    #[serde(rename = "type", default)]
    pub sensor_type: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    pub fn key(&self) -> IdentityKey {
        IdentityKey {
            facility: normalize(&self.facility),
            sensor_id: normalize(&self.sensor_id),
            sensor_type: normalize(&self.sensor_type),
        }
    }
}

/// Some backends send sensor ids as JSON numbers, others as strings.
/// Accept both and compare via the normalized string form.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}

/// Select the readings belonging to one sensor, preserving input order.
/// Matching is on the normalized identity triple only.
pub fn filter_readings<'a>(readings: &'a [Reading], identity: &SensorIdentity) -> Vec<&'a Reading> {
    let key = identity.key();
    readings.iter().filter(|r| r.key() == key).collect()
}

/// Arithmetic mean of the reading values; `None` for an empty sequence.
pub fn average(readings: &[&Reading]) -> Option<f64> {
    if readings.is_empty() {
        return None;
    }
    let sum: f64 = readings.iter().map(|r| r.value).sum();
    Some(sum / readings.len() as f64)
}

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}
