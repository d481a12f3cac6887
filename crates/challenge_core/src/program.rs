//! crates/challenge_core/src/program.rs
//!
//! The static program definition: an ordered, validated catalog of day descriptors.
//! Loaded once at startup and shared read-only behind an `Arc`.

use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use crate::domain::{Badge, DayDescriptor, DayNumber};
use crate::error::ProgramError;

#[derive(Deserialize)]
struct ProgramFile {
    name: String,
    days: Vec<DayDescriptor>,
}

#[derive(Debug, Clone)]
pub struct Program {
    name: String,
    /// Sorted so that `days[i].day == i + 1`.
    days: Vec<DayDescriptor>,
}

impl Program {
    /// Builds a program from descriptors in any order, rejecting gaps, duplicates and
    /// badges that point outside the program.
    pub fn new(name: impl Into<String>, mut days: Vec<DayDescriptor>) -> Result<Self, ProgramError> {
        if days.is_empty() {
            return Err(ProgramError::Invalid("program has no days".to_string()));
        }
        days.sort_by_key(|d| d.day);

        for (index, descriptor) in days.iter().enumerate() {
            let expected = index as DayNumber + 1;
            if descriptor.day != expected {
                return Err(ProgramError::Invalid(format!(
                    "expected day {} but found day {}",
                    expected, descriptor.day
                )));
            }
        }

        let total = days.len() as DayNumber;
        let mut badge_ids = HashSet::new();
        for descriptor in &days {
            let Some(badge) = &descriptor.badge else {
                continue;
            };
            if badge.day_required == 0 || badge.day_required > total {
                return Err(ProgramError::Invalid(format!(
                    "badge '{}' requires day {} outside 1..={}",
                    badge.id, badge.day_required, total
                )));
            }
            if badge.day_required != descriptor.day {
                return Err(ProgramError::Invalid(format!(
                    "badge '{}' is attached to day {} but requires day {}",
                    badge.id, descriptor.day, badge.day_required
                )));
            }
            if !badge_ids.insert(badge.id.as_str()) {
                return Err(ProgramError::Invalid(format!("duplicate badge id '{}'", badge.id)));
            }
        }

        Ok(Self {
            name: name.into(),
            days,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ProgramError> {
        let file: ProgramFile = serde_json::from_str(json)?;
        Self::new(file.name, file.days)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProgramError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total_days(&self) -> DayNumber {
        self.days.len() as DayNumber
    }

    pub fn contains(&self, day: DayNumber) -> bool {
        (1..=self.total_days()).contains(&day)
    }

    pub fn day(&self, day: DayNumber) -> Option<&DayDescriptor> {
        if day == 0 {
            return None;
        }
        self.days.get(day as usize - 1)
    }

    pub fn days(&self) -> &[DayDescriptor] {
        &self.days
    }

    /// All badges in day order.
    pub fn badges(&self) -> impl Iterator<Item = &Badge> {
        self.days.iter().filter_map(|d| d.badge.as_ref())
    }

    /// Badges whose required day is in `completed`. Depends on nothing else.
    pub fn earned_badges(&self, completed: &BTreeSet<DayNumber>) -> Vec<Badge> {
        self.badges()
            .filter(|badge| completed.contains(&badge.day_required))
            .cloned()
            .collect()
    }
}
