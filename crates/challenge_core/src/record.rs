//! crates/challenge_core/src/record.rs
//!
//! The persisted JSON shape of a `ProgressRecord`.
//!
//! Reads accept every shape older engine versions wrote (missing `completionDates`,
//! stray keys, out-of-range days) and normalize it in memory. Writes always emit the
//! current shape, so a legacy record is upgraded on its next write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use crate::domain::{DayNumber, ProgressRecord};

//=========================================================================================
// Wire Structs
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
    started_at: DateTime<Utc>,
    #[serde(default)]
    completed_days: Vec<DayNumber>,
    #[serde(default)]
    completion_dates: Option<BTreeMap<String, DateTime<Utc>>>,
    #[serde(default)]
    journal_entries: BTreeMap<String, String>,
    #[serde(default)]
    current_streak: u32,
    #[serde(default)]
    longest_streak: u32,
    #[serde(default)]
    streak_freeze_used: bool,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecordRef<'a> {
    started_at: &'a DateTime<Utc>,
    completed_days: Vec<DayNumber>,
    completion_dates: &'a BTreeMap<DayNumber, DateTime<Utc>>,
    journal_entries: &'a BTreeMap<DayNumber, String>,
    current_streak: u32,
    longest_streak: u32,
    streak_freeze_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_at: Option<&'a DateTime<Utc>>,
}

//=========================================================================================
// Encode / Decode
//=========================================================================================

pub fn encode(record: &ProgressRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string(&StoredRecordRef {
        started_at: &record.started_at,
        completed_days: record.completed_days.iter().copied().collect(),
        completion_dates: &record.completion_dates,
        journal_entries: &record.journal_entries,
        current_streak: record.current_streak,
        longest_streak: record.longest_streak,
        streak_freeze_used: record.streak_freeze_used,
        completed_at: record.completed_at.as_ref(),
    })
}

/// Parses a stored record and normalizes it against a program of `total_days` days.
pub fn decode(raw: &str, total_days: DayNumber) -> Result<ProgressRecord, serde_json::Error> {
    let stored: StoredRecord = serde_json::from_str(raw)?;
    let in_range = |day: DayNumber| (1..=total_days).contains(&day);

    let mut completed_days = BTreeSet::new();
    for day in stored.completed_days {
        if in_range(day) {
            completed_days.insert(day);
        } else {
            warn!(day, total_days, "Dropping out-of-range completed day from stored record");
        }
    }

    let completion_dates: BTreeMap<DayNumber, DateTime<Utc>> = match stored.completion_dates {
        Some(dates) => dates
            .into_iter()
            .filter_map(|(key, ts)| match key.parse::<DayNumber>() {
                Ok(day) if completed_days.contains(&day) => Some((day, ts)),
                _ => {
                    warn!(key = %key, "Dropping completion date for a day that is not completed");
                    None
                }
            })
            .collect(),
        None => {
            debug!("Stored record predates completion dates; treating them as empty");
            BTreeMap::new()
        }
    };

    let journal_entries = stored
        .journal_entries
        .into_iter()
        .filter_map(|(key, text)| match key.parse::<DayNumber>() {
            Ok(day) if in_range(day) => Some((day, text)),
            _ => {
                warn!(key = %key, "Dropping journal entry with an invalid day key");
                None
            }
        })
        .collect();

    let completed_at = if completed_days.len() == total_days as usize {
        stored.completed_at.or_else(|| {
            warn!(total_days, "Stored record finished every day without a completion time");
            Some(
                completion_dates
                    .values()
                    .max()
                    .copied()
                    .unwrap_or(stored.started_at),
            )
        })
    } else {
        if stored.completed_at.is_some() {
            warn!(
                completed = completed_days.len(),
                total_days, "Clearing completion time from an unfinished stored record"
            );
        }
        None
    };

    Ok(ProgressRecord {
        started_at: stored.started_at,
        completed_days,
        completion_dates,
        journal_entries,
        current_streak: stored.current_streak,
        longest_streak: stored.longest_streak.max(stored.current_streak),
        streak_freeze_used: stored.streak_freeze_used,
        completed_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{json, Value};

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, 8, 30, 0).unwrap()
    }

    #[test]
    fn encodes_the_documented_layout() {
        let mut record = ProgressRecord::new(ts(1));
        record.completed_days.extend([2, 1]);
        record.completion_dates.insert(1, ts(1));
        record.completion_dates.insert(2, ts(2));
        record.journal_entries.insert(3, "planning ahead".to_string());
        record.current_streak = 2;
        record.longest_streak = 2;

        let value: Value = serde_json::from_str(&encode(&record).unwrap()).unwrap();
        assert_eq!(value["completedDays"], json!([1, 2]));
        assert!(value["completionDates"]["2"].is_string());
        assert_eq!(value["journalEntries"]["3"], "planning ahead");
        assert_eq!(value["currentStreak"], 2);
        assert_eq!(value["streakFreezeUsed"], false);
        assert!(value.get("completedAt").is_none());
        assert!(value["startedAt"].as_str().unwrap().starts_with("2024-05-01T08:30:00"));
    }

    #[test]
    fn decodes_legacy_record_without_completion_dates() {
        let raw = r#"{
            "startedAt": "2024-05-01T08:30:00.000Z",
            "completedDays": [1, 2, 3],
            "journalEntries": { "1": "first" },
            "currentStreak": 3,
            "longestStreak": 3,
            "streakFreezeUsed": false
        }"#;
        let record = decode(raw, 30).unwrap();
        assert_eq!(record.completed_days.len(), 3);
        assert!(record.completion_dates.is_empty());
        assert_eq!(record.journal_entry(1), Some("first"));
        assert!(record.completed_at.is_none());
    }

    #[test]
    fn null_completion_dates_are_treated_as_absent() {
        let raw = r#"{ "startedAt": "2024-05-01T08:30:00Z", "completedDays": [1], "completionDates": null }"#;
        let record = decode(raw, 30).unwrap();
        assert!(record.completion_dates.is_empty());
        assert_eq!(record.current_streak, 0);
    }

    #[test]
    fn normalization_restores_subset_invariants() {
        let raw = r#"{
            "startedAt": "2024-05-01T08:30:00Z",
            "completedDays": [3, 1, 1, 0, 31],
            "completionDates": { "1": "2024-05-01T09:00:00Z", "2": "2024-05-02T09:00:00Z", "x": "2024-05-02T09:00:00Z" },
            "journalEntries": { "5": "not done yet", "40": "out of range", "abc": "junk" }
        }"#;
        let record = decode(raw, 30).unwrap();
        assert_eq!(record.completed_days.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(record.completion_dates.keys().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(record.journal_entries.keys().copied().collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn reencoding_a_legacy_record_backfills_the_map() {
        let raw = r#"{ "startedAt": "2024-05-01T08:30:00Z", "completedDays": [1] }"#;
        let record = decode(raw, 30).unwrap();
        let value: Value = serde_json::from_str(&encode(&record).unwrap()).unwrap();
        assert_eq!(value["completionDates"], json!({}));
    }

    #[test]
    fn finished_record_without_completion_time_is_backfilled() {
        let raw = json!({
            "startedAt": "2024-05-01T08:30:00Z",
            "completedDays": [1, 2, 3],
            "completionDates": { "1": "2024-05-01T09:00:00Z", "3": "2024-05-03T21:15:00Z" }
        })
        .to_string();
        let record = decode(&raw, 3).unwrap();
        assert_eq!(
            record.completed_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 3, 21, 15, 0).unwrap())
        );

        let legacy = r#"{ "startedAt": "2024-05-01T08:30:00Z", "completedDays": [1, 2] }"#;
        assert_eq!(decode(legacy, 2).unwrap().completed_at, Some(ts(1)));
    }

    #[test]
    fn completion_time_is_cleared_when_days_are_missing() {
        let raw = r#"{
            "startedAt": "2024-05-01T08:30:00Z",
            "completedDays": [1, 2, 4],
            "completedAt": "2024-05-04T09:00:00Z"
        }"#;
        let record = decode(raw, 3).unwrap();
        assert_eq!(record.completed_days.len(), 2);
        assert!(record.completed_at.is_none());
    }

    #[test]
    fn rejects_records_without_a_start() {
        assert!(decode(r#"{ "completedDays": [1] }"#, 30).is_err());
        assert!(decode("not json", 30).is_err());
    }
}
