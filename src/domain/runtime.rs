// Duty-cycle detection for current-draw sensors
use crate::domain::identity::normalize;
use crate::domain::reading::Reading;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Runs at or below this length are treated as switching noise and
/// dropped, not merely hidden.
pub const MIN_RUN_SECONDS: i64 = 20;

/// One contiguous interval during which the equipment was drawing
/// current. Derived per render and discarded when the underlying
/// data changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeSegment {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_seconds: i64,
}

/// Whether a sensor type participates in duty-cycle detection.
pub fn is_current_class(sensor_type: &str) -> bool {
    normalize(sensor_type) == "amperage"
}

/// Single left-to-right scan over a time-ordered, already-filtered
/// sequence. A reading is "on" iff its value is positive; an open run
/// at the end of the sequence is closed at the last reading's
/// timestamp.
pub fn runtime_segments(sensor_type: &str, readings: &[&Reading]) -> Vec<RuntimeSegment> {
    if !is_current_class(sensor_type) {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut pending_start: Option<DateTime<Utc>> = None;

    for reading in readings {
        let on = reading.value > 0.0;
        match (on, pending_start) {
            (true, None) => pending_start = Some(reading.timestamp),
            (false, Some(start)) => {
                push_if_long_enough(&mut segments, start, reading.timestamp);
                pending_start = None;
            }
            _ => {}
        }
    }

    if let (Some(start), Some(last)) = (pending_start, readings.last()) {
        push_if_long_enough(&mut segments, start, last.timestamp);
    }

    segments
}

fn push_if_long_enough(
    segments: &mut Vec<RuntimeSegment>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) {
    // Compare the real duration; rounding is for display only.
    let elapsed_ms = (end - start).num_milliseconds();
    if elapsed_ms > MIN_RUN_SECONDS * 1000 {
        segments.push(RuntimeSegment {
            start,
            end,
            duration_seconds: (elapsed_ms as f64 / 1000.0).round() as i64,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 14, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    fn reading(seconds: i64, value: f64) -> Reading {
        Reading {
            sensor_id: "compressor-1".into(),
            facility: "Burger Barn".into(),
            sensor_type: "amperage".into(),
            value,
            timestamp: at(seconds),
        }
    }

    fn segments_of(points: &[(i64, f64)]) -> Vec<RuntimeSegment> {
        let pool: Vec<Reading> = points.iter().map(|&(s, v)| reading(s, v)).collect();
        let refs: Vec<&Reading> = pool.iter().collect();
        runtime_segments("amperage", &refs)
    }

    #[test]
    fn test_short_runs_are_dropped() {
        // 25s on, off, 10s on, off, 30s on, off
        let segments = segments_of(&[
            (0, 4.2),
            (25, 0.0),
            (40, 3.9),
            (50, 0.0),
            (60, 4.1),
            (90, 0.0),
        ]);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].duration_seconds, 25);
        assert_eq!(segments[1].duration_seconds, 30);
    }

    #[test]
    fn test_run_at_threshold_is_dropped() {
        assert!(segments_of(&[(0, 4.2), (20, 0.0)]).is_empty());
        assert_eq!(segments_of(&[(0, 4.2), (21, 0.0)]).len(), 1);
    }

    #[test]
    fn test_fractional_run_above_threshold_is_emitted() {
        // 20.5s run clears the threshold; stored duration rounds to 21
        let pool = vec![
            reading(0, 4.2),
            Reading {
                timestamp: at(0) + Duration::milliseconds(20_500),
                ..reading(0, 0.0)
            },
        ];
        let refs: Vec<&Reading> = pool.iter().collect();
        let segments = runtime_segments("amperage", &refs);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].duration_seconds, 21);
    }

    #[test]
    fn test_open_run_closes_at_last_reading() {
        let segments = segments_of(&[(0, 0.0), (10, 4.2), (40, 4.5)]);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, at(10));
        assert_eq!(segments[0].end, at(40));
        assert_eq!(segments[0].duration_seconds, 30);
    }

    #[test]
    fn test_all_on_sequence_closes_once() {
        let segments = segments_of(&[(0, 4.0), (30, 4.1), (60, 4.2)]);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].duration_seconds, 60);
    }

    #[test]
    fn test_degenerate_sequences() {
        assert!(segments_of(&[]).is_empty());
        // single "on" reading closes with zero duration, so nothing is emitted
        assert!(segments_of(&[(0, 4.2)]).is_empty());
        assert!(segments_of(&[(0, 0.0)]).is_empty());
    }

    #[test]
    fn test_other_sensor_types_yield_no_segments() {
        let pool = vec![reading(0, 4.2), reading(60, 0.0)];
        let refs: Vec<&Reading> = pool.iter().collect();
        assert!(runtime_segments("temperature", &refs).is_empty());
    }
}
