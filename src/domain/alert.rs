// Per-sensor alert configuration and threshold evaluation
use crate::domain::identity::normalize;
use crate::domain::reading::Reading;
use serde::{Deserialize, Serialize};

/// Default chart kind per sensor type, overridable per widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Area,
    Status,
    Timeline,
}

impl ChartKind {
    pub fn for_sensor_type(sensor_type: &str) -> ChartKind {
        match normalize(sensor_type).as_str() {
            "temperature" | "voltage" | "co2" | "flow rate" | "flow_rate" => ChartKind::Line,
            "humidity" | "pressure" | "amperage" => ChartKind::Bar,
            "vibration" => ChartKind::Area,
            "boolean" => ChartKind::Status,
            "runtime" => ChartKind::Timeline,
            _ => ChartKind::Line,
        }
    }
}

/// User-editable widget configuration, keyed by the sensor's normalized
/// identity triple. Session-local; not sent on dashboard save.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertConfig {
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub email: Option<String>,
    pub show_average: Option<bool>,
    pub chart_type_override: Option<ChartKind>,
}

impl AlertConfig {
    /// Shallow-merge an edit into this config; fields absent from the
    /// edit survive unchanged.
    pub fn merge(&mut self, edit: AlertConfigEdit) {
        if let Some(low) = edit.low {
            self.low = Some(low);
        }
        if let Some(high) = edit.high {
            self.high = Some(high);
        }
        if let Some(email) = edit.email {
            self.email = Some(email);
        }
        if let Some(show_average) = edit.show_average {
            self.show_average = Some(show_average);
        }
        if let Some(kind) = edit.chart_type_override {
            self.chart_type_override = Some(kind);
        }
    }

    pub fn chart_kind(&self, sensor_type: &str) -> ChartKind {
        self.chart_type_override
            .unwrap_or_else(|| ChartKind::for_sensor_type(sensor_type))
    }
}

/// A partial edit from the config panel; only the fields the user
/// touched are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertConfigEdit {
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub email: Option<String>,
    pub show_average: Option<bool>,
    pub chart_type_override: Option<ChartKind>,
}

/// A reading annotated with its alert flag. The raw reading is copied,
/// never mutated in place.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluatedReading {
    #[serde(flatten)]
    pub reading: Reading,
    pub alert: bool,
}

/// Strict inequality on both bounds: a value exactly at `low` or `high`
/// is in range. A config with neither bound never alerts.
pub fn evaluate(reading: &Reading, config: &AlertConfig) -> EvaluatedReading {
    let below = config.low.is_some_and(|low| reading.value < low);
    let above = config.high.is_some_and(|high| reading.value > high);
    EvaluatedReading {
        reading: reading.clone(),
        alert: below || above,
    }
}
