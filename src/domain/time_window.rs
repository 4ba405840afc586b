// Time range selection and window resolution
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The range selector as it comes from the widget toolbar. Custom bounds
/// are kept as raw text (form input) and only parsed when the range is
/// applied; editing the fields without applying must not change what is
/// shown.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "range", rename_all = "lowercase")]
pub enum TimeRange {
    #[serde(rename = "1h")]
    LastHour,
    #[serde(rename = "1d")]
    LastDay,
    #[default]
    #[serde(rename = "7d")]
    LastWeek,
    All,
    Custom {
        start: Option<String>,
        end: Option<String>,
        #[serde(default)]
        applied: bool,
    },
}

/// A resolved `[start, end]` pair. `None` on either side means no bound
/// on that side, so `All` filters nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub const UNBOUNDED: TimeWindow = TimeWindow {
        start: None,
        end: None,
    };

    /// Inclusive at both bounds. The preset upper bound is "now" at
    /// evaluation time, so a reading stamped exactly now is kept.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        if let Some(start) = self.start {
            if ts < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if ts > end {
                return false;
            }
        }
        true
    }
}

/// Map a range selector to a concrete window. An unapplied, incomplete
/// or unparsable custom range degrades to `All` for display purposes
/// rather than excluding everything.
pub fn resolve_window(selection: &TimeRange, now: DateTime<Utc>) -> TimeWindow {
    match selection {
        TimeRange::LastHour => preset(now, Duration::hours(1)),
        TimeRange::LastDay => preset(now, Duration::hours(24)),
        TimeRange::LastWeek => preset(now, Duration::days(7)),
        TimeRange::All => TimeWindow::UNBOUNDED,
        TimeRange::Custom {
            start,
            end,
            applied,
        } => {
            if !applied {
                return TimeWindow::UNBOUNDED;
            }
            match (parse_instant(start.as_deref()), parse_instant(end.as_deref())) {
                (Some(start), Some(end)) => TimeWindow {
                    start: Some(start),
                    end: Some(end),
                },
                _ => TimeWindow::UNBOUNDED,
            }
        }
    }
}

fn preset(now: DateTime<Utc>, back: Duration) -> TimeWindow {
    TimeWindow {
        start: Some(now - back),
        end: Some(now),
    }
}

fn parse_instant(text: Option<&str>) -> Option<DateTime<Utc>> {
    let text = text?.trim();
    if text.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 14, 0, 0).unwrap()
    }

    #[test]
    fn test_last_hour_window() {
        let w = resolve_window(&TimeRange::LastHour, now());
        assert!(w.contains(now() - Duration::minutes(59)));
        assert!(!w.contains(now() - Duration::minutes(61)));
        assert!(w.contains(now()));
    }

    #[test]
    fn test_all_filters_nothing() {
        let w = resolve_window(&TimeRange::All, now());
        assert!(w.contains(now() - Duration::days(365)));
        assert!(w.contains(now() + Duration::hours(1)));
    }

    #[test]
    fn test_unapplied_custom_behaves_as_all() {
        let selection = TimeRange::Custom {
            start: Some("2024-05-20T10:00:00Z".into()),
            end: Some("2024-05-20T12:00:00Z".into()),
            applied: false,
        };
        assert_eq!(resolve_window(&selection, now()), TimeWindow::UNBOUNDED);
    }

    #[test]
    fn test_applied_custom_bounds_both_sides() {
        let selection = TimeRange::Custom {
            start: Some("2024-05-20T10:00:00Z".into()),
            end: Some("2024-05-20T12:00:00Z".into()),
            applied: true,
        };
        let w = resolve_window(&selection, now());
        assert!(w.contains(Utc.with_ymd_and_hms(2024, 5, 20, 11, 0, 0).unwrap()));
        assert!(w.contains(Utc.with_ymd_and_hms(2024, 5, 20, 10, 0, 0).unwrap()));
        assert!(!w.contains(Utc.with_ymd_and_hms(2024, 5, 20, 13, 0, 0).unwrap()));
    }

    #[test]
    fn test_unparsable_custom_degrades_to_all() {
        let selection = TimeRange::Custom {
            start: Some("not-a-date".into()),
            end: Some("2024-05-20T12:00:00Z".into()),
            applied: true,
        };
        assert_eq!(resolve_window(&selection, now()), TimeWindow::UNBOUNDED);
    }

    #[test]
    fn test_missing_custom_bound_degrades_to_all() {
        let selection = TimeRange::Custom {
            start: None,
            end: Some("2024-05-20T12:00:00Z".into()),
            applied: true,
        };
        assert_eq!(resolve_window(&selection, now()), TimeWindow::UNBOUNDED);
    }
}
