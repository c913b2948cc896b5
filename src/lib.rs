//! Personal spaced-repetition vocabulary tracker.
//!
//! Words are kept in a SQLite file together with their review schedule; the
//! scheduler surfaces the most overdue word and reschedules it after review.

pub mod clock;
pub mod config;
pub mod vocabulary;
