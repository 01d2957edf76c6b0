//! Session records — the rows a generated schedule is made of.
//!
//! A [`ScheduleRow`] serves both as a candidate produced by the assembler and
//! as a committed session read back from storage. Date and time are never
//! edited in place: rescheduling cancels the original row and creates a new
//! one, so the audit history survives.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Scheduled,
    Attended,
    Cancelled,
}

/// The resources a booking is assigned to, with display labels for reporting.
///
/// The engine never looks labels up itself; callers denormalize them from
/// their own teacher/student/course records before assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub teacher_id: String,
    pub teacher_name: String,
    pub room_id: String,
    pub room_name: String,
    pub student_id: String,
    pub student_name: String,
    pub course_id: String,
    pub course_title: String,
    #[serde(default)]
    pub remark: Option<String>,
}

/// A single dated session, either proposed by the assembler or already
/// committed to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub student_id: String,
    pub student_name: String,
    pub teacher_id: String,
    pub teacher_name: String,
    pub room_id: String,
    pub room_name: String,
    pub course_id: String,
    pub course_title: String,
    #[serde(default)]
    pub status: SessionStatus,
    #[serde(default)]
    pub remark: Option<String>,
    /// Human-readable conflict summary set by the assembler; `None` when the
    /// row booked cleanly.
    #[serde(default)]
    pub warning: Option<String>,
}

impl ScheduleRow {
    /// Whether this row still holds its room and teacher. Cancelled sessions
    /// free their slot.
    pub fn occupies(&self) -> bool {
        self.status != SessionStatus::Cancelled
    }

    /// Cancel the session.
    pub fn cancel(&mut self) {
        self.status = SessionStatus::Cancelled;
    }

    /// Move the session to a new slot.
    ///
    /// The receiver is cancelled and a fresh `Scheduled` row at the new
    /// date/time is returned. The new row carries no warning — it has not
    /// been conflict-checked yet.
    pub fn reschedule(
        &mut self,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<ScheduleRow> {
        if start_time >= end_time {
            return Err(ValidationError::EmptyTimeWindow {
                start: start_time,
                end: end_time,
            });
        }
        self.status = SessionStatus::Cancelled;
        Ok(ScheduleRow {
            date,
            start_time,
            end_time,
            status: SessionStatus::Scheduled,
            warning: None,
            ..self.clone()
        })
    }
}
