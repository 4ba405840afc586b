// Widget view-model builder - the derived view of one sensor
use crate::domain::alert::{evaluate, AlertConfig, ChartKind, EvaluatedReading};
use crate::domain::identity::SensorIdentity;
use crate::domain::reading::{average, celsius_to_fahrenheit, filter_readings, Reading};
use crate::domain::runtime::{runtime_segments, RuntimeSegment};
use crate::domain::time_window::{resolve_window, TimeRange};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

/// Everything the chart needs for one sensor, derived from explicit
/// inputs. Recomputed on demand; recomputation is free of side effects,
/// so callers may memoize on `(pool, identity, range, config)`.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetView {
    pub identity: SensorIdentity,
    pub title: String,
    pub chart_kind: ChartKind,
    pub points: Vec<EvaluatedReading>,
    pub average: Option<f64>,
    pub segments: Vec<RuntimeSegment>,
    pub alert_active: bool,
}

pub fn build_widget(
    pool: &[Reading],
    identity: &SensorIdentity,
    range: &TimeRange,
    config: &AlertConfig,
    unit: TemperatureUnit,
    now: DateTime<Utc>,
) -> WidgetView {
    let window = resolve_window(range, now);

    let mut visible: Vec<&Reading> = filter_readings(pool, identity)
        .into_iter()
        .filter(|r| window.contains(r.timestamp))
        .collect();
    visible.sort_by_key(|r| r.timestamp);

    let segments = runtime_segments(&identity.sensor_type, &visible);

    // Alert bounds apply to the raw values; unit conversion happens on
    // the derived copy afterwards.
    let points: Vec<EvaluatedReading> = visible
        .iter()
        .map(|r| {
            let mut evaluated = evaluate(r, config);
            if unit == TemperatureUnit::Fahrenheit && is_temperature(identity) {
                evaluated.reading.value = celsius_to_fahrenheit(evaluated.reading.value);
            }
            evaluated
        })
        .collect();
    let alert_active = points.iter().any(|p| p.alert);
    let displayed: Vec<&Reading> = points.iter().map(|p| &p.reading).collect();
    let mean = average(&displayed);

    WidgetView {
        identity: identity.clone(),
        title: identity.label(),
        chart_kind: config.chart_kind(&identity.sensor_type),
        points,
        average: mean,
        segments,
        alert_active,
    }
}

fn is_temperature(identity: &SensorIdentity) -> bool {
    crate::domain::identity::normalize(&identity.sensor_type) == "temperature"
}
