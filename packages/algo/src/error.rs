//! Error types
//!
//! Validation failures abort a run before any stage executes. Placement
//! failures are not errors; they surface as `UnresolvedConflict` values.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("topic list must not be empty")]
    EmptyTopics,

    #[error("duplicate topic id: {0}")]
    DuplicateTopicId(String),

    #[error("topic {id}: {reason}")]
    InvalidTopic { id: String, reason: String },

    #[error("invalid clock time {0:?}, expected HH:MM")]
    InvalidClockTime(String),

    #[error("{day} window {window} must end after it starts")]
    InvalidWindow { day: String, window: String },

    #[error("{day} windows {first} and {second} overlap")]
    OverlappingWindows {
        day: String,
        first: String,
        second: String,
    },

    #[error("school hours {0} must end after they start")]
    InvalidSchoolHours(String),

    #[error("{field} must be between {min} and {max}, got {value}")]
    PreferenceOutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("schedule start date is required")]
    MissingStartDate,

    #[error("unknown session id: {0}")]
    UnknownSession(String),

    #[error("invalid edit for session {session_id}: {reason}")]
    InvalidEdit { session_id: String, reason: String },
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
