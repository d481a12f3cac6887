//! Test doubles shared by the engine integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use challenge_core::{
    Badge, Clock, ContentRef, ContentResolver, DayDescriptor, DayNumber, PortError, PortResult,
    Program, ProgressStore, ProgressionEngine, ResolvedContent, Theme,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

//=========================================================================================
// Store
//=========================================================================================

/// In-memory store with switchable failures and a write counter.
#[derive(Default)]
pub struct FakeStore {
    values: Mutex<HashMap<String, String>>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub writes: AtomicUsize,
}

impl FakeStore {
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    pub fn put_raw(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProgressStore for FakeStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("read failed".to_string()));
        }
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("write failed".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.put_raw(key, value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> PortResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("delete failed".to_string()));
        }
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

//=========================================================================================
// Clock
//=========================================================================================

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }

    pub fn advance_days(&self, days: i64) {
        self.advance(Duration::days(days));
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

//=========================================================================================
// Content
//=========================================================================================

/// Resolves every reference except those whose id is listed as missing.
#[derive(Default)]
pub struct StubResolver {
    pub missing: Vec<String>,
}

#[async_trait]
impl ContentResolver for StubResolver {
    async fn resolve(&self, refs: &[ContentRef]) -> PortResult<Vec<ResolvedContent>> {
        refs.iter()
            .map(|r| {
                if self.missing.contains(&r.id) {
                    Err(PortError::NotFound(r.key()))
                } else {
                    Ok(ResolvedContent {
                        reference: r.clone(),
                        title: None,
                        body: format!("body of {}", r.key()),
                        source: None,
                    })
                }
            })
            .collect()
    }
}

//=========================================================================================
// Fixtures
//=========================================================================================

pub const TOTAL_DAYS: DayNumber = 30;
pub const KEY: &str = "challenge-progress:test-user";

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
}

/// A program of `total` days with badges on days 1, 7 and the last day.
pub fn program(total: DayNumber) -> Arc<Program> {
    let days = (1..=total)
        .map(|day| DayDescriptor {
            day,
            theme: Theme::Reflection,
            content_refs: vec![ContentRef::new("verse", format!("v{day}"))],
            badge: [1, 7, total].contains(&day).then(|| Badge {
                id: format!("badge-{day}"),
                name: format!("Day {day}"),
                icon: "star".to_string(),
                day_required: day,
            }),
            challenge: format!("Challenge {day}"),
            reflection_prompt: format!("Prompt {day}"),
        })
        .collect();
    Arc::new(Program::new("Test Program", days).unwrap())
}

pub struct Harness {
    pub store: Arc<FakeStore>,
    pub clock: Arc<ManualClock>,
    pub program: Arc<Program>,
    pub engine: ProgressionEngine,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(FakeStore::default());
        let clock = Arc::new(ManualClock::at(start_time()));
        let program = program(TOTAL_DAYS);
        let engine = ProgressionEngine::new(program.clone(), store.clone(), clock.clone(), KEY);
        Self {
            store,
            clock,
            program,
            engine,
        }
    }

    /// Another engine over the same store, program and clock.
    pub fn engine_for(&self, key: &str) -> ProgressionEngine {
        ProgressionEngine::new(
            self.program.clone(),
            self.store.clone(),
            self.clock.clone(),
            key,
        )
    }
}
