//! Error types for schedule generation and commit.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::conflict::ConflictDetail;

/// Input problems caught before any expansion happens. Bad input is rejected
/// up front, never coerced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("class limit must be at least 1")]
    ZeroClassLimit,

    #[error("session window {start}..{end} is empty or inverted")]
    EmptyTimeWindow { start: NaiveTime, end: NaiveTime },

    #[error("a weekly class needs at least one weekday")]
    NoWeekdays,

    #[error("no session dates were supplied")]
    NoDates,

    #[error("session date {date} falls outside the effective range")]
    DateOutOfRange {
        date: NaiveDate,
        scope_start: NaiveDate,
        scope_end: Option<NaiveDate>,
    },

    #[error("effective range ends {end} before it starts {start}")]
    InvertedScope { start: NaiveDate, end: NaiveDate },

    /// The assembled recurrence rule was rejected by the calendar-rules layer.
    #[error("recurrence expansion failed: {0}")]
    Expansion(String),
}

/// A booking landed between preview and commit and now collides with the row.
///
/// The only retryable failure in the engine: the affected row must be
/// re-previewed, sibling rows commit independently.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("session on {date} {start_time}..{end_time} collides with a booking committed after preview")]
pub struct StaleConflict {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// The collisions that appeared since the preview snapshot was taken.
    pub conflicts: Vec<ConflictDetail>,
}

/// Convenience alias for validation paths.
pub type Result<T> = std::result::Result<T, ValidationError>;
