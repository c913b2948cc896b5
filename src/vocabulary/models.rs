//! Data models for the vocabulary store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A word being learned, with its current review schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyEntry {
    /// The word itself; unique and case-sensitive
    pub word: String,
    /// Definition or free-form note, may be empty
    pub comment: String,
    pub created_at: DateTime<Utc>,
    /// When the word becomes due again
    pub next_review_date: DateTime<Utc>,
    /// Current spacing in days, always at least 1
    pub interval_days: i64,
}

impl VocabularyEntry {
    /// A fresh entry, due immediately
    pub fn new(word: String, comment: String, now: DateTime<Utc>) -> Self {
        Self {
            word,
            comment,
            created_at: now,
            next_review_date: now,
            interval_days: 1,
        }
    }

    /// Check if the entry is due as of the given instant
    pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
        self.next_review_date < as_of
    }
}
