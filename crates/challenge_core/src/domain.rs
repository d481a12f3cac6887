//! crates/challenge_core/src/domain.rs
//!
//! Defines the core data structures for the challenge tracker.
//! The static program catalog derives serde because it is loaded from JSON; the
//! persisted shape of `ProgressRecord` lives in `record.rs`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A 1-based day number inside the program.
pub type DayNumber = u32;

//=========================================================================================
// Program Definition (static, read-only)
//=========================================================================================

/// Category tag attached to each day of the program.
///
/// Tags outside the known set are kept verbatim in `Other` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Faith,
    Gratitude,
    Patience,
    Charity,
    Family,
    Knowledge,
    Character,
    Reflection,
    #[serde(untagged)]
    Other(String),
}

impl Theme {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Faith => "faith",
            Self::Gratitude => "gratitude",
            Self::Patience => "patience",
            Self::Charity => "charity",
            Self::Family => "family",
            Self::Knowledge => "knowledge",
            Self::Character => "character",
            Self::Reflection => "reflection",
            Self::Other(tag) => tag,
        }
    }
}

/// An opaque pointer to content the `ContentResolver` knows how to hydrate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRef {
    pub kind: String,
    pub id: String,
}

impl ContentRef {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// The `kind:id` form used as a lookup key by catalog-backed resolvers.
    pub fn key(&self) -> String {
        format!("{}:{}", self.kind, self.id)
    }
}

/// A milestone marker earned by completing `day_required`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub day_required: DayNumber,
}

/// Static definition of one program day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayDescriptor {
    pub day: DayNumber,
    pub theme: Theme,
    #[serde(default)]
    pub content_refs: Vec<ContentRef>,
    #[serde(default)]
    pub badge: Option<Badge>,
    #[serde(default)]
    pub challenge: String,
    #[serde(default)]
    pub reflection_prompt: String,
}

//=========================================================================================
// Progress Record (the single mutable entity per user)
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    /// Day-1 anchor for all calendar arithmetic.
    pub started_at: DateTime<Utc>,
    pub completed_days: BTreeSet<DayNumber>,
    /// Keys are always a subset of `completed_days`. Legacy records may lack entries.
    pub completion_dates: BTreeMap<DayNumber, DateTime<Utc>>,
    /// Reflections, independent of completion.
    pub journal_entries: BTreeMap<DayNumber, String>,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub streak_freeze_used: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProgressRecord {
    /// A zeroed record anchored at `started_at`.
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            completed_days: BTreeSet::new(),
            completion_dates: BTreeMap::new(),
            journal_entries: BTreeMap::new(),
            current_streak: 0,
            longest_streak: 0,
            streak_freeze_used: false,
            completed_at: None,
        }
    }

    pub fn is_completed(&self, day: DayNumber) -> bool {
        self.completed_days.contains(&day)
    }

    pub fn completed_count(&self) -> usize {
        self.completed_days.len()
    }

    pub fn journal_entry(&self, day: DayNumber) -> Option<&str> {
        self.journal_entries.get(&day).map(String::as_str)
    }
}

/// Lifecycle of a user's run through the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ProgramStatus {
    pub fn of(record: Option<&ProgressRecord>) -> Self {
        match record {
            None => Self::NotStarted,
            Some(record) if record.completed_at.is_some() => Self::Completed,
            Some(_) => Self::InProgress,
        }
    }
}

//=========================================================================================
// Derived Views
//=========================================================================================

/// One piece of hydrated content returned by the `ContentResolver`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContent {
    pub reference: ContentRef,
    pub title: Option<String>,
    pub body: String,
    pub source: Option<String>,
}

/// Everything a client needs to display a single day.
#[derive(Debug, Clone)]
pub struct DayBundle {
    pub descriptor: DayDescriptor,
    pub content: Vec<ResolvedContent>,
    pub accessible: bool,
    pub completed: bool,
    pub journal_entry: Option<String>,
}

/// What `complete_day` reports back besides the updated record.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub record: ProgressRecord,
    pub newly_earned_badges: Vec<Badge>,
    /// The call moved the program into `Completed`.
    pub program_completed: bool,
    /// No record existed, so one was created as part of this call.
    pub implicitly_started: bool,
    /// The day was already done; only the journal may have changed.
    pub already_completed: bool,
}

/// A single-read summary of a user's progress.
#[derive(Debug, Clone)]
pub struct ProgressOverview {
    pub status: ProgramStatus,
    pub current_day: DayNumber,
    pub total_days: DayNumber,
    pub completed_days: Vec<DayNumber>,
    pub accessible_days: Vec<DayNumber>,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub can_use_freeze: bool,
    pub earned_badges: Vec<Badge>,
    pub completion_percent: u8,
}
