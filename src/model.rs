use serde::{Deserialize, Serialize};
use std::fmt;

pub const HOUR_MS: i64 = 60 * 60 * 1000;
pub const HOURS_PER_DAY: u32 = 24;

/// Epoch milliseconds of the start of a local hour. Unique key of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteKey(i64);

impl NoteKey {
    pub fn from_millis(millis: i64) -> Self {
        NoteKey(millis)
    }

    pub fn millis(self) -> i64 {
        self.0
    }

    pub fn checked_add_hours(self, hours: i64) -> Option<Self> {
        hours
            .checked_mul(HOUR_MS)
            .and_then(|ms| self.0.checked_add(ms))
            .map(NoteKey)
    }
}

#[cfg(test)]
impl std::ops::Add<i64> for NoteKey {
    type Output = NoteKey;

    fn add(self, hours: i64) -> NoteKey {
        self.checked_add_hours(hours).expect("note key overflow")
    }
}

impl fmt::Display for NoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub key: NoteKey,
    pub text: String,
}

impl Note {
    /// Returns `None` when the text is blank: a blank note is no note.
    pub fn new(key: NoteKey, text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Note {
            key,
            text: trimmed.to_string(),
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("note store unavailable during {op}: {reason}")]
    Unavailable { op: &'static str, reason: String },
    #[error("refusing to store an empty note at {0}")]
    EmptyValue(NoteKey),
}

impl StoreError {
    pub fn unavailable(op: &'static str, reason: impl fmt::Display) -> Self {
        StoreError::Unavailable {
            op,
            reason: reason.to_string(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CalendarError {
    #[error("invalid date range: {0}")]
    InvalidRange(String),
    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),
    #[error("no saved note at {0} to remove")]
    NothingToRemove(NoteKey),
    #[error("{0}:00 does not exist on this day (clock change)")]
    SkippedHour(u32),
}

/// Non-fatal problem surfaced to the presentation layer alongside a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub key: NoteKey,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.key)
    }
}
