//! Teacher availability — recurring weekly bookable hours overridden by
//! dated absences.
//!
//! Availability data enters the engine as a per-teacher snapshot
//! ([`TeacherCalendar`]) loaded once per batch and passed by reference, so a
//! whole assembly run sees one consistent view.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// A recurring weekly window in which a teacher may be booked. Multiple
/// non-overlapping windows per weekday are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub weekday: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// A dated absence. Always wins over any availability slot on that date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Absence {
    pub date: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
}

/// What to assume about a teacher with no configured availability slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityPolicy {
    /// No slots configured means the teacher is bookable at any hour.
    /// Availability is an opt-in restriction.
    #[default]
    Permissive,
    /// No slots configured means the teacher is never bookable.
    Strict,
}

/// Outcome of an availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    /// The window is not fully contained in any slot on that weekday.
    OutsideHours,
    /// No slots configured at all and the policy is strict.
    NoConfiguredHours,
    /// An absence record covers the date.
    Absent { reason: Option<String> },
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

/// Snapshot of one teacher's bookable hours and absences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherCalendar {
    pub teacher_id: String,
    #[serde(default)]
    pub slots: Vec<AvailabilitySlot>,
    #[serde(default)]
    pub absences: Vec<Absence>,
}

impl TeacherCalendar {
    /// A calendar with no slots and no absences — under the permissive
    /// policy, a teacher that is always bookable.
    pub fn empty(teacher_id: String) -> Self {
        TeacherCalendar {
            teacher_id,
            slots: Vec::new(),
            absences: Vec::new(),
        }
    }

    /// The absence covering `date`, if any.
    pub fn absence_on(&self, date: NaiveDate) -> Option<&Absence> {
        self.absences.iter().find(|a| a.date == date)
    }

    /// Check whether the teacher can take a session on `date` spanning
    /// `[start_time, end_time)`.
    ///
    /// The window is bookable when some slot on that weekday fully contains
    /// it. An absence on the date overrides whatever the slots say.
    pub fn check(
        &self,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        policy: AvailabilityPolicy,
    ) -> Availability {
        // Absence first: it overrides even a fully covering slot.
        if let Some(absence) = self.absence_on(date) {
            return Availability::Absent {
                reason: absence.reason.clone(),
            };
        }

        if self.slots.is_empty() {
            return match policy {
                AvailabilityPolicy::Permissive => Availability::Available,
                AvailabilityPolicy::Strict => Availability::NoConfiguredHours,
            };
        }

        let weekday = date.weekday();
        let covered = self.slots.iter().any(|slot| {
            slot.weekday == weekday && slot.start_time <= start_time && end_time <= slot.end_time
        });

        if covered {
            Availability::Available
        } else {
            Availability::OutsideHours
        }
    }
}
