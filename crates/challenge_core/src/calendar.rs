//! crates/challenge_core/src/calendar.rs
//!
//! Midnight-normalized date arithmetic. Every comparison the engine makes is between
//! calendar dates in a fixed UTC offset, never between raw timestamps.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// The calendar date `ts` falls on in `offset`.
pub fn local_date(ts: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    ts.with_timezone(&offset).date_naive()
}

/// Whole calendar days from `from` to `to`. Negative if `to` is on an earlier date.
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>, offset: FixedOffset) -> i64 {
    (local_date(to, offset) - local_date(from, offset)).num_days()
}

/// 1-based, uncapped program day that `now` falls on for a run started at `started_at`.
pub fn journey_day(started_at: DateTime<Utc>, now: DateTime<Utc>, offset: FixedOffset) -> i64 {
    days_between(started_at, now, offset) + 1
}
