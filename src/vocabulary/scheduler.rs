//! Review scheduling on top of the word store
//!
//! The scheduler holds no entry state of its own; every call goes back to
//! the store.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::algorithm::{interval_choices, ReviewOutcome, MAX_INTERVAL_DAYS};
use super::models::VocabularyEntry;
use super::storage::{VocabularyStorage, VocabularyStorageError};

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Invalid interval: {0} (expected 1 to {} days)", MAX_INTERVAL_DAYS)]
    InvalidInterval(i64),

    #[error("Word not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] VocabularyStorageError),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Picks the next word to review and records review outcomes
pub struct Scheduler {
    store: VocabularyStorage,
}

impl Scheduler {
    pub fn new(store: VocabularyStorage) -> Self {
        Self { store }
    }

    /// The underlying store, for adding, listing and deleting words
    pub fn store(&self) -> &VocabularyStorage {
        &self.store
    }

    /// The most overdue word as of `as_of`, if any
    pub fn get_due_entry(&self, as_of: DateTime<Utc>) -> Result<Option<VocabularyEntry>> {
        Ok(self.store.next_due(as_of)?)
    }

    /// The most overdue word right now, according to the store's clock
    pub fn get_due_entry_now(&self) -> Result<Option<VocabularyEntry>> {
        self.get_due_entry(self.store.clock().now())
    }

    /// The four intervals offered after reviewing a word spaced `current_interval` days
    pub fn interval_choices(&self, current_interval: i64) -> [i64; 4] {
        interval_choices(current_interval)
    }

    /// Reschedule `word` to come back in `interval_days` days.
    pub fn record_review(&self, word: &str, interval_days: i64) -> Result<VocabularyEntry> {
        if !(1..=MAX_INTERVAL_DAYS).contains(&interval_days) {
            return Err(SchedulerError::InvalidInterval(interval_days));
        }

        match self.store.update_schedule(word, interval_days)? {
            Some(entry) => Ok(entry),
            None => {
                log::warn!("Review recorded for missing word '{}'", word);
                Err(SchedulerError::NotFound(word.to_string()))
            }
        }
    }

    /// Reschedule `word` using the interval a review outcome selects from
    /// its current interval.
    pub fn record_outcome(&self, word: &str, outcome: ReviewOutcome) -> Result<VocabularyEntry> {
        let entry = self
            .store
            .get(word)?
            .ok_or_else(|| SchedulerError::NotFound(word.to_string()))?;

        self.record_review(word, outcome.interval(entry.interval_days))
    }
}
