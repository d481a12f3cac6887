//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between clients and the REST API.
//! Core domain types stay serde-free on the wire; everything here maps from them.

use challenge_core::{
    Badge, CompletionOutcome, DayBundle, ProgramStatus, ProgressOverview, ProgressRecord,
    ResolvedContent,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

//=========================================================================================
// Requests
//=========================================================================================

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct CompleteDayRequest {
    /// Optional reflection saved together with the completion.
    #[serde(default)]
    pub journal: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct JournalRequest {
    /// The new reflection. Blank text removes the entry.
    pub text: String,
}

//=========================================================================================
// Responses
//=========================================================================================

/// A user's progress record, in its persisted layout.
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub started_at: DateTime<Utc>,
    pub completed_days: Vec<u32>,
    pub completion_dates: BTreeMap<String, DateTime<Utc>>,
    pub journal_entries: BTreeMap<String, String>,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub streak_freeze_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&ProgressRecord> for ProgressResponse {
    fn from(record: &ProgressRecord) -> Self {
        Self {
            started_at: record.started_at,
            completed_days: record.completed_days.iter().copied().collect(),
            completion_dates: record
                .completion_dates
                .iter()
                .map(|(day, ts)| (day.to_string(), *ts))
                .collect(),
            journal_entries: record
                .journal_entries
                .iter()
                .map(|(day, text)| (day.to_string(), text.clone()))
                .collect(),
            current_streak: record.current_streak,
            longest_streak: record.longest_streak,
            streak_freeze_used: record.streak_freeze_used,
            completed_at: record.completed_at,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatusDto {
    NotStarted,
    InProgress,
    Completed,
}

impl From<ProgramStatus> for StatusDto {
    fn from(status: ProgramStatus) -> Self {
        match status {
            ProgramStatus::NotStarted => Self::NotStarted,
            ProgramStatus::InProgress => Self::InProgress,
            ProgramStatus::Completed => Self::Completed,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct StatusResponse {
    pub status: StatusDto,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentDayResponse {
    pub current_day: u32,
    pub total_days: u32,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct AccessResponse {
    pub day: u32,
    pub accessible: bool,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct AccessibleDaysResponse {
    pub days: Vec<u32>,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BadgeDto {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub day_required: u32,
}

impl From<Badge> for BadgeDto {
    fn from(badge: Badge) -> Self {
        Self {
            id: badge.id,
            name: badge.name,
            icon: badge.icon,
            day_required: badge.day_required,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct BadgesResponse {
    pub badges: Vec<BadgeDto>,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub progress: ProgressResponse,
    pub newly_earned_badges: Vec<BadgeDto>,
    pub program_completed: bool,
    pub implicitly_started: bool,
    pub already_completed: bool,
}

impl From<CompletionOutcome> for CompletionResponse {
    fn from(outcome: CompletionOutcome) -> Self {
        Self {
            progress: ProgressResponse::from(&outcome.record),
            newly_earned_badges: outcome
                .newly_earned_badges
                .into_iter()
                .map(BadgeDto::from)
                .collect(),
            program_completed: outcome.program_completed,
            implicitly_started: outcome.implicitly_started,
            already_completed: outcome.already_completed,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FreezeResponse {
    pub can_use_freeze: bool,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ContentDto {
    pub kind: String,
    pub id: String,
    pub title: Option<String>,
    pub body: String,
    pub source: Option<String>,
}

impl From<ResolvedContent> for ContentDto {
    fn from(content: ResolvedContent) -> Self {
        Self {
            kind: content.reference.kind,
            id: content.reference.id,
            title: content.title,
            body: content.body,
            source: content.source,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayBundleResponse {
    pub day: u32,
    pub theme: String,
    pub challenge: String,
    pub reflection_prompt: String,
    pub badge: Option<BadgeDto>,
    pub content: Vec<ContentDto>,
    pub accessible: bool,
    pub completed: bool,
    pub journal_entry: Option<String>,
}

impl From<DayBundle> for DayBundleResponse {
    fn from(bundle: DayBundle) -> Self {
        let descriptor = bundle.descriptor;
        Self {
            day: descriptor.day,
            theme: descriptor.theme.as_str().to_string(),
            challenge: descriptor.challenge,
            reflection_prompt: descriptor.reflection_prompt,
            badge: descriptor.badge.map(BadgeDto::from),
            content: bundle.content.into_iter().map(ContentDto::from).collect(),
            accessible: bundle.accessible,
            completed: bundle.completed,
            journal_entry: bundle.journal_entry,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub status: StatusDto,
    pub current_day: u32,
    pub total_days: u32,
    pub completed_days: Vec<u32>,
    pub accessible_days: Vec<u32>,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub can_use_freeze: bool,
    pub earned_badges: Vec<BadgeDto>,
    pub completion_percent: u8,
}

impl From<ProgressOverview> for OverviewResponse {
    fn from(overview: ProgressOverview) -> Self {
        Self {
            status: overview.status.into(),
            current_day: overview.current_day,
            total_days: overview.total_days,
            completed_days: overview.completed_days,
            accessible_days: overview.accessible_days,
            current_streak: overview.current_streak,
            longest_streak: overview.longest_streak,
            can_use_freeze: overview.can_use_freeze,
            earned_badges: overview.earned_badges.into_iter().map(BadgeDto::from).collect(),
            completion_percent: overview.completion_percent,
        }
    }
}
