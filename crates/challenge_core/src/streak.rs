//! crates/challenge_core/src/streak.rs
//!
//! Consecutive-completion streak counting.

use std::collections::BTreeSet;

use crate::domain::DayNumber;

/// Counts consecutive completed program days ending at `today_journey_day`, or at the
/// day before it when today is not done yet.
///
/// The walk stops at the first day that is not in `completed`. The record's
/// `streak_freeze_used` flag is not consulted: a used freeze does not bridge a gap.
pub fn calculate_streak(completed: &BTreeSet<DayNumber>, today_journey_day: i64) -> u32 {
    let mut check_day = today_journey_day;
    if !is_completed(completed, check_day) {
        check_day -= 1;
    }

    let mut streak = 0;
    while check_day >= 1 && is_completed(completed, check_day) {
        streak += 1;
        check_day -= 1;
    }
    streak
}

fn is_completed(completed: &BTreeSet<DayNumber>, day: i64) -> bool {
    DayNumber::try_from(day).map_or(false, |day| completed.contains(&day))
}
