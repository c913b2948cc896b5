//! Interval policy for vocabulary review
//!
//! After each review the learner picks one of four intervals derived from
//! the word's current interval `I`:
//! - Again: 1 day (forgotten, start over)
//! - Hard: `I` days (barely remembered, repeat the same spacing)
//! - Good: `2 * I` days (remembered)
//! - Easy: `4 * I` days (remembered easily)
//!
//! The growth is deliberately simple; there is no ease factor or review
//! history involved.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound for any interval, roughly one hundred years
pub const MAX_INTERVAL_DAYS: i64 = 36_500;

/// One of the four answers a learner can give after a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewOutcome {
    Again,
    Hard,
    Good,
    Easy,
}

impl ReviewOutcome {
    /// All outcomes, in the order their intervals are offered
    pub const ALL: [ReviewOutcome; 4] = [Self::Again, Self::Hard, Self::Good, Self::Easy];

    /// The interval this outcome selects for a word currently spaced `current_interval` days
    pub fn interval(self, current_interval: i64) -> i64 {
        let choices = interval_choices(current_interval);
        match self {
            Self::Again => choices[0],
            Self::Hard => choices[1],
            Self::Good => choices[2],
            Self::Easy => choices[3],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        }
    }
}

impl fmt::Display for ReviewOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown review outcome '{0}' (expected again, hard, good or easy)")]
pub struct ParseReviewOutcomeError(String);

impl FromStr for ReviewOutcome {
    type Err = ParseReviewOutcomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "again" => Ok(Self::Again),
            "hard" => Ok(Self::Hard),
            "good" => Ok(Self::Good),
            "easy" => Ok(Self::Easy),
            _ => Err(ParseReviewOutcomeError(s.to_string())),
        }
    }
}

/// Candidate next intervals for a word currently spaced `current_interval` days
///
/// Always `[1, I, 2I, 4I]`. A current interval below 1 is treated as 1 and
/// the growth saturates at [`MAX_INTERVAL_DAYS`].
pub fn interval_choices(current_interval: i64) -> [i64; 4] {
    let interval = current_interval.clamp(1, MAX_INTERVAL_DAYS);
    [
        1,
        interval,
        interval.saturating_mul(2).min(MAX_INTERVAL_DAYS),
        interval.saturating_mul(4).min(MAX_INTERVAL_DAYS),
    ]
}

/// When a word reviewed at `reviewed_at` becomes due again
///
/// Returns `None` if the result cannot be represented.
pub fn next_review_date(reviewed_at: DateTime<Utc>, interval_days: i64) -> Option<DateTime<Utc>> {
    Duration::try_days(interval_days).and_then(|delta| reviewed_at.checked_add_signed(delta))
}

/// Calendar-ish units used when displaying an interval, largest first
const DISPLAY_UNITS: [(i64, &str); 4] = [(365, "y"), (30, "mo"), (7, "w"), (1, "d")];

/// Format an interval in days with its two largest non-zero units, e.g. `1w 1d`
///
/// Doubling from one day rarely lands on whole weeks or months, so the
/// remainder is kept instead of being rounded away.
pub fn format_interval(days: i64) -> String {
    if days < 1 {
        return "now".to_string();
    }

    let mut remaining = days;
    let mut parts = Vec::new();
    for (size, suffix) in DISPLAY_UNITS {
        let count = remaining / size;
        if count > 0 {
            parts.push(format!("{}{}", count, suffix));
            remaining %= size;
        } else if !parts.is_empty() {
            // Only adjacent units are shown together
            break;
        }
        if parts.len() == 2 {
            break;
        }
    }
    parts.join(" ")
}
