//! Vocabulary tracking for tkvocab
//!
//! This module provides:
//! - The word store (SQLite-backed, one row per word)
//! - The interval policy offered after each review
//! - The scheduler that picks the next word and records review outcomes

pub mod algorithm;
pub mod models;
pub mod scheduler;
pub mod storage;

pub use algorithm::{ReviewOutcome, MAX_INTERVAL_DAYS};
pub use models::*;
pub use scheduler::{Scheduler, SchedulerError};
pub use storage::{VocabularyStorage, VocabularyStorageError};
