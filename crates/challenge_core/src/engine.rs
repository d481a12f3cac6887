//! crates/challenge_core/src/engine.rs
//!
//! The progression engine: every state transition over a user's progress record.
//!
//! Each operation is a single read-modify-write against the injected `ProgressStore`.
//! There is no locking; two concurrent writers for the same key can lose an update.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::calendar;
use crate::domain::{
    Badge, CompletionOutcome, DayBundle, DayNumber, ProgramStatus, ProgressOverview,
    ProgressRecord,
};
use crate::error::{EngineError, EngineResult};
use crate::ports::{Clock, ContentResolver, ProgressStore};
use crate::program::Program;
use crate::record;
use crate::streak;

//=========================================================================================
// The Engine Struct
//=========================================================================================

/// Owns the progress record stored under one key.
///
/// Cheap to construct: the program, store and clock are shared `Arc`s, so callers
/// usually build one engine per request.
#[derive(Clone)]
pub struct ProgressionEngine {
    program: Arc<Program>,
    store: Arc<dyn ProgressStore>,
    clock: Arc<dyn Clock>,
    utc_offset: FixedOffset,
    key: String,
}

impl ProgressionEngine {
    pub fn new(
        program: Arc<Program>,
        store: Arc<dyn ProgressStore>,
        clock: Arc<dyn Clock>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            program,
            store,
            clock,
            utc_offset: Utc.fix(),
            key: key.into(),
        }
    }

    /// Sets the UTC offset whose midnight separates calendar days.
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    //=====================================================================================
    // Lifecycle
    //=====================================================================================

    /// Writes a fresh record, overwriting an in-progress one.
    ///
    /// A completed run is kept until `reset`.
    pub async fn start(&self) -> EngineResult<ProgressRecord> {
        if ProgramStatus::of(self.load().await?.as_ref()) == ProgramStatus::Completed {
            return Err(EngineError::AlreadyCompleted);
        }
        let record = ProgressRecord::new(self.clock.now());
        self.persist(&record).await?;
        info!(key = %self.key, "Challenge started");
        Ok(record)
    }

    pub async fn get_progress(&self) -> EngineResult<Option<ProgressRecord>> {
        self.load().await
    }

    pub async fn status(&self) -> EngineResult<ProgramStatus> {
        Ok(ProgramStatus::of(self.load().await?.as_ref()))
    }

    /// Deletes the record, returning the user to `NotStarted`.
    pub async fn reset(&self) -> EngineResult<()> {
        self.store
            .delete(&self.key)
            .await
            .map_err(EngineError::Storage)?;
        info!(key = %self.key, "Challenge reset");
        Ok(())
    }

    //=====================================================================================
    // Calendar Views
    //=====================================================================================

    /// The day calendar time has advanced to. A ceiling, not a gate.
    pub async fn current_day(&self) -> EngineResult<DayNumber> {
        let record = self.load().await?;
        Ok(self.current_day_for(record.as_ref(), self.clock.now()))
    }

    pub async fn is_day_accessible(&self, day: DayNumber) -> EngineResult<bool> {
        self.check_day(day)?;
        let record = self.load().await?;
        let now = self.clock.now();
        let current_day = self.current_day_for(record.as_ref(), now);
        Ok(self.is_unlocked(record.as_ref(), day, current_day, now))
    }

    /// Every accessible day, ascending.
    pub async fn accessible_days(&self) -> EngineResult<Vec<DayNumber>> {
        let record = self.load().await?;
        Ok(self.accessible_days_for(record.as_ref(), self.clock.now()))
    }

    //=====================================================================================
    // Mutations
    //=====================================================================================

    /// Marks `day` as done, creating the record first if none exists.
    ///
    /// Completing an already-completed day only replaces its journal entry (when one
    /// is given); streaks, dates and badges are left untouched. Blank journal text
    /// counts as no text.
    pub async fn complete_day(
        &self,
        day: DayNumber,
        journal: Option<String>,
    ) -> EngineResult<CompletionOutcome> {
        self.check_day(day)?;
        let journal = journal.filter(|text| !text.trim().is_empty());
        let now = self.clock.now();

        let (mut record, implicitly_started) = match self.load().await? {
            Some(record) => (record, false),
            None => {
                info!(key = %self.key, day, "No record found; starting challenge on completion");
                (ProgressRecord::new(now), true)
            }
        };

        if record.is_completed(day) {
            if let Some(text) = journal {
                record.journal_entries.insert(day, text);
                self.persist(&record).await?;
            }
            debug!(key = %self.key, day, "Day already completed");
            return Ok(CompletionOutcome {
                record,
                newly_earned_badges: Vec::new(),
                program_completed: false,
                implicitly_started,
                already_completed: true,
            });
        }

        let earned_before = self.program.earned_badges(&record.completed_days);

        record.completed_days.insert(day);
        record.completion_dates.insert(day, now);
        if let Some(text) = journal {
            record.journal_entries.insert(day, text);
        }

        let today = calendar::journey_day(record.started_at, now, self.utc_offset);
        record.current_streak = streak::calculate_streak(&record.completed_days, today);
        record.longest_streak = record.longest_streak.max(record.current_streak);

        let program_completed =
            record.completed_count() == self.program.total_days() as usize;
        if program_completed {
            record.completed_at = Some(now);
        }

        self.persist(&record).await?;

        let newly_earned_badges: Vec<Badge> = self
            .program
            .earned_badges(&record.completed_days)
            .into_iter()
            .filter(|badge| !earned_before.iter().any(|b| b.id == badge.id))
            .collect();

        info!(
            key = %self.key,
            day,
            streak = record.current_streak,
            badges = newly_earned_badges.len(),
            program_completed,
            "Day completed"
        );

        Ok(CompletionOutcome {
            record,
            newly_earned_badges,
            program_completed,
            implicitly_started,
            already_completed: false,
        })
    }

    /// Replaces the reflection for `day`. Blank text removes it.
    pub async fn save_journal_entry(
        &self,
        day: DayNumber,
        text: String,
    ) -> EngineResult<ProgressRecord> {
        self.check_day(day)?;
        let mut record = self.load().await?.ok_or(EngineError::NotStarted)?;

        if text.trim().is_empty() {
            record.journal_entries.remove(&day);
        } else {
            record.journal_entries.insert(day, text);
        }
        self.persist(&record).await?;
        debug!(key = %self.key, day, "Journal entry saved");
        Ok(record)
    }

    //=====================================================================================
    // Streak Freeze
    //=====================================================================================

    pub async fn can_use_freeze(&self) -> EngineResult<bool> {
        Ok(self
            .load()
            .await?
            .is_some_and(|record| !record.streak_freeze_used))
    }

    /// Spends the one-shot freeze. Only flips the flag; streak counts are unchanged.
    pub async fn use_freeze(&self) -> EngineResult<()> {
        let mut record = self.load().await?.ok_or(EngineError::NotStarted)?;
        if record.streak_freeze_used {
            return Err(EngineError::FreezeUnavailable);
        }
        record.streak_freeze_used = true;
        self.persist(&record).await?;
        info!(key = %self.key, "Streak freeze used");
        Ok(())
    }

    //=====================================================================================
    // Derived Views
    //=====================================================================================

    pub async fn earned_badges(&self) -> EngineResult<Vec<Badge>> {
        Ok(match self.load().await? {
            Some(record) => self.program.earned_badges(&record.completed_days),
            None => Vec::new(),
        })
    }

    /// Assembles the display bundle for `day`. The only operation that touches the
    /// content resolver; its failures come back as `EngineError::Content`.
    pub async fn day_bundle(
        &self,
        day: DayNumber,
        resolver: &dyn ContentResolver,
    ) -> EngineResult<DayBundle> {
        self.check_day(day)?;
        let descriptor = self
            .program
            .day(day)
            .cloned()
            .ok_or(EngineError::InvalidDay {
                day,
                total: self.program.total_days(),
            })?;

        let record = self.load().await?;
        let now = self.clock.now();
        let current_day = self.current_day_for(record.as_ref(), now);
        let accessible = self.is_unlocked(record.as_ref(), day, current_day, now);

        let content = resolver
            .resolve(&descriptor.content_refs)
            .await
            .map_err(EngineError::Content)?;

        Ok(DayBundle {
            descriptor,
            content,
            accessible,
            completed: record.as_ref().is_some_and(|r| r.is_completed(day)),
            journal_entry: record
                .as_ref()
                .and_then(|r| r.journal_entry(day))
                .map(str::to_string),
        })
    }

    pub async fn overview(&self) -> EngineResult<ProgressOverview> {
        let record = self.load().await?;
        let now = self.clock.now();
        let total_days = self.program.total_days();

        let (completed_days, current_streak, longest_streak, can_use_freeze, earned_badges) =
            match &record {
                Some(r) => (
                    r.completed_days.iter().copied().collect::<Vec<_>>(),
                    r.current_streak,
                    r.longest_streak,
                    !r.streak_freeze_used,
                    self.program.earned_badges(&r.completed_days),
                ),
                None => (Vec::new(), 0, 0, false, Vec::new()),
            };
        let completion_percent = (completed_days.len() * 100 / total_days as usize) as u8;

        Ok(ProgressOverview {
            status: ProgramStatus::of(record.as_ref()),
            current_day: self.current_day_for(record.as_ref(), now),
            total_days,
            accessible_days: self.accessible_days_for(record.as_ref(), now),
            completed_days,
            current_streak,
            longest_streak,
            can_use_freeze,
            earned_badges,
            completion_percent,
        })
    }

    //=====================================================================================
    // Pure Helpers
    //=====================================================================================

    fn check_day(&self, day: DayNumber) -> EngineResult<()> {
        if self.program.contains(day) {
            Ok(())
        } else {
            Err(EngineError::InvalidDay {
                day,
                total: self.program.total_days(),
            })
        }
    }

    fn current_day_for(&self, record: Option<&ProgressRecord>, now: DateTime<Utc>) -> DayNumber {
        let total = self.program.total_days();
        let Some(record) = record else {
            return 1;
        };
        if record.completed_count() >= total as usize {
            return total;
        }
        let calendar_day = calendar::journey_day(record.started_at, now, self.utc_offset)
            .min(i64::from(total))
            .max(1);
        calendar_day as DayNumber
    }

    /// Day 1 is always open. Day K opens once day K-1 is completed and its completion
    /// date is strictly before today. Without a stored completion date, day K opens
    /// once calendar time has reached it.
    fn is_unlocked(
        &self,
        record: Option<&ProgressRecord>,
        day: DayNumber,
        current_day: DayNumber,
        now: DateTime<Utc>,
    ) -> bool {
        if day <= 1 {
            return true;
        }
        let Some(record) = record else {
            return false;
        };
        let previous = day - 1;
        if !record.is_completed(previous) {
            return false;
        }
        match record.completion_dates.get(&previous) {
            Some(completed_at) => calendar::days_between(*completed_at, now, self.utc_offset) > 0,
            None => day <= current_day,
        }
    }

    fn accessible_days_for(
        &self,
        record: Option<&ProgressRecord>,
        now: DateTime<Utc>,
    ) -> Vec<DayNumber> {
        let current_day = self.current_day_for(record, now);
        (1..=self.program.total_days())
            .filter(|&day| self.is_unlocked(record, day, current_day, now))
            .collect()
    }

    //=====================================================================================
    // Storage
    //=====================================================================================

    async fn load(&self) -> EngineResult<Option<ProgressRecord>> {
        let raw = self
            .store
            .get(&self.key)
            .await
            .map_err(EngineError::Storage)?;
        match raw {
            Some(raw) => Ok(Some(record::decode(&raw, self.program.total_days())?)),
            None => {
                debug!(key = %self.key, "No progress record stored");
                Ok(None)
            }
        }
    }

    async fn persist(&self, record: &ProgressRecord) -> EngineResult<()> {
        let raw = record::encode(record)?;
        self.store
            .set(&self.key, &raw)
            .await
            .map_err(EngineError::Storage)
    }
}
