//! Lap enrichment
//!
//! After collection, each lap gains average values computed over the record
//! messages falling inside its time window. The averages cover third-party
//! running-power fields and the standard running-dynamics fields, neither of
//! which the protocol summarizes per lap itself.

use chrono::{DateTime, Duration, Utc};
use serde_json::Number;
use tracing::debug;

use crate::translate::TranslatedMessage;

/// Tracked record keys and the lap keys their averages are attached under.
/// Adding a metric means adding a row here, not new control flow.
const LAP_AVERAGES: &[(&str, &str)] = &[
    // Third-party running power (Stryd) developer fields.
    ("Power", "avg_stryd_power"),
    ("Air Power", "avg_air_power"),
    ("Form Power", "avg_form_power"),
    ("Ground Time", "avg_stryd_ground_time"),
    ("Impact Loading Rate", "avg_impact_loading_rate"),
    ("Leg Spring Stiffness", "avg_leg_spring_stiffness"),
    ("Vertical Oscillation", "avg_stryd_vo"),
    // Standard running-dynamics fields.
    ("stance_time", "avg_garmin_stance_time"),
    ("stance_time_balance", "avg_garmin_stance_time_balance"),
    ("vertical_oscillation", "avg_garmin_vo"),
    ("vertical_ratio", "avg_garmin_vertical_ratio"),
    ("step_length", "avg_garmin_step_length"),
];

/// Attach per-lap averages of the tracked record metrics.
///
/// Laps without a parsable `start_time`/`total_timer_time` pair are left
/// unmodified. Records are matched against the half-open window
/// `[start, start + total_timer_time)`; a record exactly at the end belongs
/// to the next lap. Keys with no matching records are omitted.
pub fn enrich_laps(laps: &mut [TranslatedMessage], records: &[TranslatedMessage]) {
    if laps.is_empty() || records.is_empty() {
        return;
    }

    for lap in laps.iter_mut() {
        let Some((start, end)) = lap_window(lap) else {
            debug!("lap missing start_time or total_timer_time, skipping enrichment");
            continue;
        };

        let mut sums = [(0.0_f64, 0_u64); LAP_AVERAGES.len()];

        for record in records {
            let Some(timestamp) = record
                .get("timestamp")
                .and_then(|v| v.as_str())
                .and_then(parse_rfc3339)
            else {
                continue;
            };
            if timestamp < start || timestamp >= end {
                continue;
            }
            for (slot, (record_key, _)) in sums.iter_mut().zip(LAP_AVERAGES) {
                if let Some(value) = number(record, record_key) {
                    slot.0 += value;
                    slot.1 += 1;
                }
            }
        }

        for (&(sum, count), (_, lap_key)) in sums.iter().zip(LAP_AVERAGES) {
            if count == 0 {
                continue;
            }
            if let Some(avg) = Number::from_f64(sum / count as f64) {
                lap.insert((*lap_key).to_string(), serde_json::Value::Number(avg));
            }
        }
    }
}

/// The lap's record-matching window, when derivable.
fn lap_window(lap: &TranslatedMessage) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = lap
        .get("start_time")
        .and_then(|v| v.as_str())
        .and_then(parse_rfc3339)?;
    let duration_secs = number(lap, "total_timer_time")?;
    let end = start + Duration::nanoseconds((duration_secs * 1e9) as i64);
    Some((start, end))
}

fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn number(mesg: &TranslatedMessage, key: &str) -> Option<f64> {
    mesg.get(key)?.as_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(pairs: &[(&str, serde_json::Value)]) -> TranslatedMessage {
        let mut out = TranslatedMessage::new();
        for (key, value) in pairs {
            out.insert((*key).to_string(), value.clone());
        }
        out
    }

    fn record(timestamp: &str, key: &str, value: f64) -> TranslatedMessage {
        message(&[("timestamp", json!(timestamp)), (key, json!(value))])
    }

    #[test]
    fn test_window_is_half_open() {
        // Lap of 60s starting at 10:00:00; the record exactly at 10:01:00
        // belongs to the next lap.
        let mut laps = vec![message(&[
            ("start_time", json!("2024-03-01T10:00:00Z")),
            ("total_timer_time", json!(60.0)),
        ])];
        let records = vec![
            record("2024-03-01T10:00:00Z", "stance_time", 100.0),
            record("2024-03-01T10:00:30Z", "stance_time", 200.0),
            record("2024-03-01T10:01:00Z", "stance_time", 300.0),
        ];
        enrich_laps(&mut laps, &records);
        assert_eq!(
            laps[0].get("avg_garmin_stance_time"),
            Some(&json!(150.0)),
            "records at start and mid-lap average; the end-boundary record is excluded"
        );
    }

    #[test]
    fn test_developer_metrics_use_renamed_keys() {
        let mut laps = vec![message(&[
            ("start_time", json!("2024-03-01T10:00:00Z")),
            ("total_timer_time", json!(120.0)),
        ])];
        let records = vec![
            record("2024-03-01T10:00:10Z", "Power", 280.0),
            record("2024-03-01T10:00:20Z", "Power", 300.0),
        ];
        enrich_laps(&mut laps, &records);
        assert_eq!(laps[0].get("avg_stryd_power"), Some(&json!(290.0)));
        assert!(
            !laps[0].contains_key("Power"),
            "the source key must not leak onto the lap"
        );
    }

    #[test]
    fn test_unmatched_keys_are_omitted_not_zero_filled() {
        let mut laps = vec![message(&[
            ("start_time", json!("2024-03-01T10:00:00Z")),
            ("total_timer_time", json!(60.0)),
        ])];
        let records = vec![record("2024-03-01T10:00:10Z", "stance_time", 240.0)];
        enrich_laps(&mut laps, &records);
        assert!(laps[0].contains_key("avg_garmin_stance_time"));
        assert!(!laps[0].contains_key("avg_stryd_power"));
        assert!(!laps[0].contains_key("avg_garmin_vo"));
    }

    #[test]
    fn test_lap_without_start_time_is_left_unmodified() {
        let mut laps = vec![message(&[("total_timer_time", json!(60.0))])];
        let records = vec![record("2024-03-01T10:00:10Z", "stance_time", 240.0)];
        enrich_laps(&mut laps, &records);
        assert_eq!(laps[0].len(), 1);
    }

    #[test]
    fn test_lap_with_numeric_start_time_is_left_unmodified() {
        // Raw-value conversions emit start_time as an integer; such laps are
        // not enrichable.
        let mut laps = vec![message(&[
            ("start_time", json!(1_080_000_000)),
            ("total_timer_time", json!(60.0)),
        ])];
        let records = vec![record("2024-03-01T10:00:10Z", "stance_time", 240.0)];
        enrich_laps(&mut laps, &records);
        assert!(!laps[0].contains_key("avg_garmin_stance_time"));
    }

    #[test]
    fn test_records_without_timestamps_are_ignored() {
        let mut laps = vec![message(&[
            ("start_time", json!("2024-03-01T10:00:00Z")),
            ("total_timer_time", json!(60.0)),
        ])];
        let records = vec![
            message(&[("stance_time", json!(999.0))]),
            record("2024-03-01T10:00:10Z", "stance_time", 100.0),
        ];
        enrich_laps(&mut laps, &records);
        assert_eq!(laps[0].get("avg_garmin_stance_time"), Some(&json!(100.0)));
    }

    #[test]
    fn test_each_lap_windows_its_own_records() {
        let mut laps = vec![
            message(&[
                ("start_time", json!("2024-03-01T10:00:00Z")),
                ("total_timer_time", json!(60.0)),
            ]),
            message(&[
                ("start_time", json!("2024-03-01T10:01:00Z")),
                ("total_timer_time", json!(60.0)),
            ]),
        ];
        let records = vec![
            record("2024-03-01T10:00:30Z", "vertical_ratio", 8.0),
            record("2024-03-01T10:01:30Z", "vertical_ratio", 10.0),
        ];
        enrich_laps(&mut laps, &records);
        assert_eq!(laps[0].get("avg_garmin_vertical_ratio"), Some(&json!(8.0)));
        assert_eq!(laps[1].get("avg_garmin_vertical_ratio"), Some(&json!(10.0)));
    }

    #[test]
    fn test_fractional_duration_truncates_at_nanoseconds() {
        let mut laps = vec![message(&[
            ("start_time", json!("2024-03-01T10:00:00Z")),
            ("total_timer_time", json!(29.5)),
        ])];
        let records = vec![
            record("2024-03-01T10:00:29Z", "step_length", 1000.0),
            record("2024-03-01T10:00:30Z", "step_length", 2000.0),
        ];
        enrich_laps(&mut laps, &records);
        assert_eq!(laps[0].get("avg_garmin_step_length"), Some(&json!(1000.0)));
    }
}
