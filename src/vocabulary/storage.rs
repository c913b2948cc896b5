//! SQLite storage for vocabulary entries
//!
//! All words live in a single table keyed by the word itself:
//! ```text
//! words(word TEXT PRIMARY KEY,
//!       comment TEXT NOT NULL,
//!       created_at TEXT NOT NULL,
//!       next_review_date TEXT NOT NULL,
//!       interval_days INTEGER NOT NULL)
//! ```
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings with microsecond
//! precision, so ordering by the text column is chronological ordering.
//! That only holds for four-digit years, so writes outside 0000-9999 are refused.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Datelike, Duration, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use super::algorithm::{next_review_date, MAX_INTERVAL_DAYS};
use super::models::VocabularyEntry;
use crate::clock::{Clock, SystemClock};

#[derive(Error, Debug)]
pub enum VocabularyStorageError {
    #[error("Word already exists: {0}")]
    DuplicateKey(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Corrupt record for '{word}': {reason}")]
    CorruptRecord { word: String, reason: String },

    #[error("Cannot schedule a review {0} days out")]
    ScheduleOutOfRange(i64),

    #[error("Timestamp {0} is outside the storable years 0000-9999")]
    TimestampOutOfRange(DateTime<Utc>),
}

impl VocabularyStorageError {
    /// Whether the error means the storage itself failed, as opposed to a
    /// rejected request such as a duplicate word
    pub fn is_unavailable(&self) -> bool {
        !matches!(
            self,
            Self::DuplicateKey(_) | Self::ScheduleOutOfRange(_) | Self::TimestampOutOfRange(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, VocabularyStorageError>;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS words (
        word TEXT PRIMARY KEY,
        comment TEXT NOT NULL,
        created_at TEXT NOT NULL,
        next_review_date TEXT NOT NULL,
        interval_days INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_words_next_review_date ON words(next_review_date);
"#;

/// Latest instant the text encoding can order correctly
const LATEST_TIMESTAMP: &str = "9999-12-31T23:59:59.999999Z";

const ENTRY_COLUMNS: &str = "word, comment, created_at, next_review_date, interval_days";

/// How long a write waits on a lock held by another connection
const BUSY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// A row as it comes out of SQLite, before timestamps are parsed
type RawEntry = (String, String, String, String, i64);

/// Durable store of vocabulary entries
///
/// Each operation runs as a single statement against one connection guarded
/// by a mutex, so readers never see a half-applied schedule change and the
/// store can be shared between threads behind an `Arc`.
pub struct VocabularyStorage {
    conn: Mutex<Connection>,
    clock: Arc<dyn Clock>,
    db_path: Option<PathBuf>,
}

impl VocabularyStorage {
    /// Open (or create) the word database at the given path.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with_clock(db_path, Arc::new(SystemClock))
    }

    /// Open (or create) the word database, reading time from `clock`.
    pub fn open_with_clock(db_path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Result<Self> {
        let db_path = db_path.into();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&db_path)?;
        log::info!("Opened word database at {:?}", db_path);
        Self::with_connection(conn, clock, Some(db_path))
    }

    /// Transient in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::in_memory_with_clock(Arc::new(SystemClock))
    }

    pub fn in_memory_with_clock(clock: Arc<dyn Clock>) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, clock, None)
    }

    fn with_connection(
        conn: Connection,
        clock: Arc<dyn Clock>,
        db_path: Option<PathBuf>,
    ) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
            clock,
            db_path,
        })
    }

    /// Get the database path, `None` for in-memory stores.
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// The clock this store stamps records with.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| VocabularyStorageError::LockPoisoned)
    }

    /// Current instant at the precision timestamps are stored with
    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(6)
    }

    // ==================== Entry Operations ====================

    /// Add a new word, due immediately with a one-day interval
    pub fn add(&self, word: &str, comment: &str) -> Result<VocabularyEntry> {
        let entry = VocabularyEntry::new(word.to_string(), comment.to_string(), self.now());
        let stamp = encode_timestamp(entry.created_at)?;

        let conn = self.conn()?;
        let inserted = conn.execute(
            &format!("INSERT INTO words ({}) VALUES (?1, ?2, ?3, ?4, ?5)", ENTRY_COLUMNS),
            params![
                entry.word,
                entry.comment,
                stamp,
                stamp,
                entry.interval_days,
            ],
        );

        match inserted {
            Ok(_) => {
                log::info!("Added word '{}'", entry.word);
                Ok(entry)
            }
            Err(e) if is_primary_key_violation(&e) => {
                log::warn!("Rejected duplicate word '{}'", word);
                Err(VocabularyStorageError::DuplicateKey(word.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get a single word, if present
    pub fn get(&self, word: &str) -> Result<Option<VocabularyEntry>> {
        let conn = self.conn()?;
        let raw = conn
            .query_row(
                &format!("SELECT {} FROM words WHERE word = ?1", ENTRY_COLUMNS),
                params![word],
                raw_entry,
            )
            .optional()?;

        raw.map(entry_from_raw).transpose()
    }

    /// List all words in ascending word order
    pub fn list(&self) -> Result<Vec<VocabularyEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM words ORDER BY word ASC", ENTRY_COLUMNS))?;
        let rows = stmt
            .query_map([], raw_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        log::debug!("Listed {} words", rows.len());
        rows.into_iter().map(entry_from_raw).collect()
    }

    /// Delete a word. Returns whether anything was removed; deleting a
    /// missing word is not an error.
    pub fn delete(&self, word: &str) -> Result<bool> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM words WHERE word = ?1", params![word])?;

        if removed > 0 {
            log::info!("Deleted word '{}'", word);
        } else {
            log::debug!("Delete of missing word '{}' ignored", word);
        }
        Ok(removed > 0)
    }

    /// Reschedule a word `interval_days` from now.
    ///
    /// Interval and review date change together in one statement. Returns the
    /// updated entry, or `None` (without error) if the word does not exist.
    pub fn update_schedule(
        &self,
        word: &str,
        interval_days: i64,
    ) -> Result<Option<VocabularyEntry>> {
        if !(1..=MAX_INTERVAL_DAYS).contains(&interval_days) {
            return Err(VocabularyStorageError::ScheduleOutOfRange(interval_days));
        }
        let due = next_review_date(self.now(), interval_days)
            .ok_or(VocabularyStorageError::ScheduleOutOfRange(interval_days))?;
        let due_stamp = encode_timestamp(due)?;

        let conn = self.conn()?;
        let raw = conn
            .query_row(
                &format!(
                    "UPDATE words SET interval_days = ?1, next_review_date = ?2 WHERE word = ?3 RETURNING {}",
                    ENTRY_COLUMNS
                ),
                params![interval_days, due_stamp, word],
                raw_entry,
            )
            .optional()?;

        match raw {
            Some(raw) => {
                log::info!("Scheduled '{}' in {} day(s), due {}", word, interval_days, due);
                entry_from_raw(raw).map(Some)
            }
            None => {
                log::debug!("Schedule update for missing word '{}' ignored", word);
                Ok(None)
            }
        }
    }

    // ==================== Review Queries ====================

    /// The most overdue word as of `as_of`, if any is due.
    ///
    /// Ties on review date go to the alphabetically first word.
    pub fn next_due(&self, as_of: DateTime<Utc>) -> Result<Option<VocabularyEntry>> {
        let Some(cutoff) = due_cutoff(as_of) else {
            return Ok(None);
        };

        let conn = self.conn()?;
        let raw = conn
            .query_row(
                &format!(
                    "SELECT {} FROM words WHERE next_review_date <= ?1 \
                     ORDER BY next_review_date ASC, word ASC LIMIT 1",
                    ENTRY_COLUMNS
                ),
                params![cutoff],
                raw_entry,
            )
            .optional()?;

        log::debug!("Next due as of {}: {:?}", as_of, raw.as_ref().map(|r| &r.0));
        raw.map(entry_from_raw).transpose()
    }
}

/// Latest stored review date that still counts as due at `as_of`, encoded.
///
/// Stored dates have microsecond precision, so this is the last microsecond
/// strictly before `as_of`. Instants past year 9999 clamp to the last storable
/// one; instants before year 0 have nothing due.
fn due_cutoff(as_of: DateTime<Utc>) -> Option<String> {
    let floor = as_of.trunc_subsecs(6);
    let last_due = if floor < as_of {
        floor
    } else {
        floor - Duration::microseconds(1)
    };

    match last_due.year() {
        y if y < 0 => None,
        y if y > 9999 => Some(LATEST_TIMESTAMP.to_string()),
        _ => Some(last_due.to_rfc3339_opts(SecondsFormat::Micros, true)),
    }
}

/// Encode an instant for storage; only four-digit years keep text order
/// equal to chronological order.
fn encode_timestamp(instant: DateTime<Utc>) -> Result<String> {
    if !(0..=9999).contains(&instant.year()) {
        return Err(VocabularyStorageError::TimestampOutOfRange(instant));
    }
    Ok(instant.to_rfc3339_opts(SecondsFormat::Micros, true))
}

fn decode_timestamp(word: &str, column: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| VocabularyStorageError::CorruptRecord {
            word: word.to_string(),
            reason: format!("bad {} '{}': {}", column, value, e),
        })
}

fn raw_entry(row: &rusqlite::Row) -> rusqlite::Result<RawEntry> {
    Ok((
        row.get::<_, String>(0)?, // word
        row.get::<_, String>(1)?, // comment
        row.get::<_, String>(2)?, // created_at
        row.get::<_, String>(3)?, // next_review_date
        row.get::<_, i64>(4)?,    // interval_days
    ))
}

fn entry_from_raw(
    (word, comment, created_at, next_review_date, interval_days): RawEntry,
) -> Result<VocabularyEntry> {
    if interval_days < 1 {
        return Err(VocabularyStorageError::CorruptRecord {
            word,
            reason: format!("interval_days is {}", interval_days),
        });
    }

    let created_at = decode_timestamp(&word, "created_at", &created_at)?;
    let next_review_date = decode_timestamp(&word, "next_review_date", &next_review_date)?;

    Ok(VocabularyEntry {
        word,
        comment,
        created_at,
        next_review_date,
        interval_days,
    })
}

fn is_primary_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;
    use std::thread;
    use tempfile::TempDir;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn setup() -> (VocabularyStorage, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start()));
        let store = VocabularyStorage::in_memory_with_clock(clock.clone()).unwrap();
        (store, clock)
    }

    fn words(entries: &[VocabularyEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.word.as_str()).collect()
    }

    #[test]
    fn test_add_sets_initial_schedule() {
        let (store, _clock) = setup();
        let entry = store.add("hola", "hello").unwrap();

        assert_eq!(entry.interval_days, 1);
        assert_eq!(entry.created_at, start());
        assert_eq!(entry.next_review_date, start());
        assert_eq!(store.get("hola").unwrap(), Some(entry));
    }

    #[test]
    fn test_duplicate_add_is_rejected_and_keeps_original() {
        let (store, _clock) = setup();
        store.add("hola", "hello").unwrap();

        let err = store.add("hola", "hi there").unwrap_err();
        assert!(matches!(err, VocabularyStorageError::DuplicateKey(ref w) if w == "hola"));
        assert!(!err.is_unavailable());

        let entry = store.get("hola").unwrap().unwrap();
        assert_eq!(entry.comment, "hello");
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_words_are_case_sensitive() {
        let (store, _clock) = setup();
        store.add("Hola", "").unwrap();
        store.add("hola", "").unwrap();
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_comment_allowed() {
        let (store, _clock) = setup();
        let entry = store.add("gato", "").unwrap();
        assert_eq!(entry.comment, "");
    }

    #[test]
    fn test_list_is_sorted_by_word() {
        let (store, _clock) = setup();
        assert!(store.list().unwrap().is_empty());

        store.add("banana", "").unwrap();
        store.add("apple", "").unwrap();
        store.add("cherry", "").unwrap();

        assert_eq!(words(&store.list().unwrap()), vec!["apple", "banana", "cherry"]);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (store, _clock) = setup();
        store.add("hola", "hello").unwrap();
        store.add("adios", "bye").unwrap();

        assert!(store.delete("hola").unwrap());
        assert!(!store.delete("hola").unwrap());
        assert!(!store.delete("never-added").unwrap());

        assert_eq!(words(&store.list().unwrap()), vec!["adios"]);
    }

    #[test]
    fn test_update_schedule_moves_interval_and_date_together() {
        let (store, clock) = setup();
        store.add("hola", "hello").unwrap();
        clock.advance(Duration::hours(3));

        let updated = store.update_schedule("hola", 4).unwrap().unwrap();
        assert_eq!(updated.interval_days, 4);
        assert_eq!(updated.next_review_date, start() + Duration::hours(3) + Duration::days(4));
        assert_eq!(updated.created_at, start());
        assert_eq!(store.get("hola").unwrap(), Some(updated));
    }

    #[test]
    fn test_update_schedule_missing_word_is_noop() {
        let (store, _clock) = setup();
        store.add("hola", "hello").unwrap();

        assert_eq!(store.update_schedule("adios", 2).unwrap(), None);
        assert_eq!(words(&store.list().unwrap()), vec!["hola"]);
    }

    #[test]
    fn test_update_schedule_rejects_unrepresentable_interval() {
        let (store, _clock) = setup();
        store.add("hola", "hello").unwrap();

        assert!(matches!(
            store.update_schedule("hola", 0),
            Err(VocabularyStorageError::ScheduleOutOfRange(0))
        ));
        assert!(matches!(
            store.update_schedule("hola", i64::MAX),
            Err(VocabularyStorageError::ScheduleOutOfRange(_))
        ));
        assert_eq!(store.get("hola").unwrap().unwrap().interval_days, 1);
    }

    #[test]
    fn test_interval_past_maximum_leaves_store_readable() {
        let (store, _clock) = setup();
        store.add("hola", "hello").unwrap();

        let err = store.update_schedule("hola", 3_000_000).unwrap_err();
        assert!(matches!(err, VocabularyStorageError::ScheduleOutOfRange(3_000_000)));
        assert!(!err.is_unavailable());

        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].interval_days, 1);
        assert_eq!(entries[0].next_review_date, start());
        assert!(store.next_due(start() + Duration::days(1)).unwrap().is_some());
    }

    #[test]
    fn test_review_date_past_year_9999_is_rejected() {
        let (store, clock) = setup();
        store.add("hola", "hello").unwrap();
        clock.set(Utc.with_ymd_and_hms(9999, 12, 30, 0, 0, 0).unwrap());

        assert!(matches!(
            store.update_schedule("hola", 5),
            Err(VocabularyStorageError::TimestampOutOfRange(_))
        ));
        assert_eq!(store.get("hola").unwrap().unwrap().next_review_date, start());

        clock.set(Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap());
        assert!(matches!(
            store.add("adios", "bye"),
            Err(VocabularyStorageError::TimestampOutOfRange(_))
        ));
        assert_eq!(words(&store.list().unwrap()), vec!["hola"]);
    }

    #[test]
    fn test_next_due_far_future_cutoff() {
        let (store, _clock) = setup();
        let entry = store.add("hola", "hello").unwrap();

        let far = Utc.with_ymd_and_hms(10001, 1, 1, 0, 0, 0).unwrap();
        assert!(entry.is_due(far));
        let due = store.next_due(far).unwrap();
        assert_eq!(due.map(|e| e.word), Some("hola".to_string()));
    }

    #[test]
    fn test_next_due_before_year_zero() {
        let (store, _clock) = setup();
        store.add("hola", "hello").unwrap();

        let ancient = Utc.with_ymd_and_hms(-5, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(store.next_due(ancient).unwrap(), None);
    }

    #[test]
    fn test_fresh_word_is_due_just_after_creation() {
        let (store, _clock) = setup();
        store.add("hola", "hello").unwrap();

        assert_eq!(store.next_due(start()).unwrap(), None);
        let due = store.next_due(start() + Duration::microseconds(1)).unwrap();
        assert_eq!(due.map(|e| e.word), Some("hola".to_string()));
    }

    #[test]
    fn test_sub_microsecond_cutoff_still_counts_as_due() {
        let (store, _clock) = setup();
        store.add("hola", "hello").unwrap();

        let due = store.next_due(start() + Duration::nanoseconds(1)).unwrap();
        assert!(due.is_some());
    }

    #[test]
    fn test_next_due_returns_most_overdue() {
        let (store, clock) = setup();
        store.add("beta", "").unwrap();
        clock.advance(Duration::hours(1));
        store.add("alpha", "").unwrap();

        let now = start() + Duration::days(1);
        let due = store.next_due(now).unwrap().unwrap();
        assert_eq!(due.word, "beta");

        store.delete("beta").unwrap();
        let due = store.next_due(now).unwrap().unwrap();
        assert_eq!(due.word, "alpha");
    }

    #[test]
    fn test_next_due_ties_break_by_word() {
        let (store, _clock) = setup();
        store.add("zorro", "").unwrap();
        store.add("abeja", "").unwrap();
        store.add("mono", "").unwrap();

        let now = start() + Duration::minutes(1);
        for _ in 0..3 {
            assert_eq!(store.next_due(now).unwrap().unwrap().word, "abeja");
        }
    }

    #[test]
    fn test_next_due_ignores_future_words() {
        let (store, _clock) = setup();
        store.add("hola", "").unwrap();
        store.update_schedule("hola", 3).unwrap();

        assert_eq!(store.next_due(start() + Duration::days(2)).unwrap(), None);
        assert!(store.next_due(start() + Duration::days(3) + Duration::seconds(1)).unwrap().is_some());
    }

    #[test]
    fn test_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("tkvocab.db");
        let clock = Arc::new(ManualClock::new(start()));

        {
            let store = VocabularyStorage::open_with_clock(&db_path, clock.clone()).unwrap();
            store.add("hola", "hello").unwrap();
            store.update_schedule("hola", 2).unwrap();
            assert_eq!(store.db_path(), Some(db_path.as_path()));
        }

        let store = VocabularyStorage::open_with_clock(&db_path, clock).unwrap();
        let entry = store.get("hola").unwrap().unwrap();
        assert_eq!(entry.comment, "hello");
        assert_eq!(entry.interval_days, 2);
        assert_eq!(entry.next_review_date, start() + Duration::days(2));
    }

    #[test]
    fn test_corrupt_interval_is_reported() {
        let (store, _clock) = setup();
        store
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO words (word, comment, created_at, next_review_date, interval_days) \
                 VALUES ('bad', '', '2024-01-01T00:00:00.000000Z', '2024-01-01T00:00:00.000000Z', 0)",
                [],
            )
            .unwrap();

        let err = store.get("bad").unwrap_err();
        assert!(matches!(err, VocabularyStorageError::CorruptRecord { .. }));
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_corrupt_timestamp_is_reported() {
        let (store, _clock) = setup();
        store
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO words (word, comment, created_at, next_review_date, interval_days) \
                 VALUES ('bad', '', 'yesterday', '2024-01-01T00:00:00.000000Z', 1)",
                [],
            )
            .unwrap();

        assert!(matches!(store.list(), Err(VocabularyStorageError::CorruptRecord { .. })));
    }

    #[test]
    fn test_concurrent_adds_of_same_word() {
        let store = Arc::new(VocabularyStorage::open_in_memory().unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.add("hola", &format!("attempt {}", i)).is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(store.list().unwrap().len(), 1);
    }
}
