//! Conflict detection — room and teacher double bookings plus availability
//! violations, checked against an immutable snapshot of committed sessions.
//!
//! Intervals are half-open: a session ending exactly when another starts is
//! NOT a conflict. Detection annotates, never blocks — every conflict on a
//! candidate is reported and the caller decides what to do.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::availability::{Availability, AvailabilityPolicy, TeacherCalendar};
use crate::expander::CandidateSlot;
use crate::session::{Assignment, ScheduleRow};

/// Why a candidate session cannot be booked cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    RoomDoubleBooking,
    TeacherDoubleBooking,
    TeacherUnavailable,
    TeacherAbsent,
}

impl ConflictKind {
    /// Short label used when composing row warnings.
    pub fn label(&self) -> &'static str {
        match self {
            ConflictKind::RoomDoubleBooking => "room double booking",
            ConflictKind::TeacherDoubleBooking => "teacher double booking",
            ConflictKind::TeacherUnavailable => "teacher unavailable",
            ConflictKind::TeacherAbsent => "teacher absent",
        }
    }
}

/// A detected conflict, denormalized for human-readable reporting.
///
/// For double bookings the names describe the session already holding the
/// slot; for availability conflicts they describe the candidate itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictDetail {
    pub kind: ConflictKind,
    pub date: NaiveDate,
    pub room_id: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub course_title: String,
    pub teacher_name: String,
    pub student_name: String,
}

/// Half-open interval overlap: `[s1, e1)` and `[s2, e2)` on the same date
/// overlap iff `s1 < e2 && s2 < e1`. Back-to-back sessions never collide.
pub fn windows_overlap(s1: NaiveTime, e1: NaiveTime, s2: NaiveTime, e2: NaiveTime) -> bool {
    s1 < e2 && s2 < e1
}

/// Committed sessions indexed by date, built once per batch and shared by
/// reference across every candidate in it. Cancelled rows are dropped on
/// entry — they no longer occupy their slot.
#[derive(Debug, Clone, Default)]
pub struct BookingSnapshot {
    by_date: HashMap<NaiveDate, Vec<ScheduleRow>>,
}

impl BookingSnapshot {
    pub fn new(rows: impl IntoIterator<Item = ScheduleRow>) -> Self {
        let mut by_date: HashMap<NaiveDate, Vec<ScheduleRow>> = HashMap::new();
        for row in rows {
            if row.occupies() {
                by_date.entry(row.date).or_default().push(row);
            }
        }
        BookingSnapshot { by_date }
    }

    /// All occupying rows on `date`.
    pub fn on_date(&self, date: NaiveDate) -> &[ScheduleRow] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_date.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}

/// Run every conflict check for one candidate slot.
///
/// `peers` are the *other* candidates generated in the same batch — a
/// misconfigured recurrence can collide with itself before anything reaches
/// committed state, and since siblings share the batch's room and teacher,
/// any overlap double-books both resources.
///
/// All conflicts are reported, not just the first, and detection never
/// rejects the candidate; callers decide whether to re-assign or proceed
/// with an explicit override.
pub fn detect_conflicts(
    slot: &CandidateSlot,
    assignment: &Assignment,
    snapshot: &BookingSnapshot,
    peers: &[CandidateSlot],
    calendar: &TeacherCalendar,
    policy: AvailabilityPolicy,
) -> Vec<ConflictDetail> {
    let mut conflicts = Vec::new();

    for row in snapshot.on_date(slot.date) {
        if !windows_overlap(slot.start_time, slot.end_time, row.start_time, row.end_time) {
            continue;
        }
        if row.room_id == assignment.room_id {
            conflicts.push(committed_detail(ConflictKind::RoomDoubleBooking, row));
        }
        if row.teacher_id == assignment.teacher_id {
            conflicts.push(committed_detail(ConflictKind::TeacherDoubleBooking, row));
        }
    }

    for peer in peers {
        if peer.date == slot.date
            && windows_overlap(
                slot.start_time,
                slot.end_time,
                peer.start_time,
                peer.end_time,
            )
        {
            conflicts.push(sibling_detail(
                ConflictKind::RoomDoubleBooking,
                peer,
                assignment,
            ));
            conflicts.push(sibling_detail(
                ConflictKind::TeacherDoubleBooking,
                peer,
                assignment,
            ));
        }
    }

    match calendar.check(slot.date, slot.start_time, slot.end_time, policy) {
        Availability::Available => {}
        Availability::Absent { .. } => {
            conflicts.push(candidate_detail(ConflictKind::TeacherAbsent, slot, assignment));
        }
        Availability::OutsideHours | Availability::NoConfiguredHours => {
            conflicts.push(candidate_detail(
                ConflictKind::TeacherUnavailable,
                slot,
                assignment,
            ));
        }
    }

    conflicts
}

/// Detail for a collision with a committed row: report the occupying session.
fn committed_detail(kind: ConflictKind, row: &ScheduleRow) -> ConflictDetail {
    ConflictDetail {
        kind,
        date: row.date,
        room_id: row.room_id.clone(),
        start_time: row.start_time,
        end_time: row.end_time,
        course_title: row.course_title.clone(),
        teacher_name: row.teacher_name.clone(),
        student_name: row.student_name.clone(),
    }
}

/// Detail for a collision with a sibling candidate in the same batch.
fn sibling_detail(kind: ConflictKind, peer: &CandidateSlot, assignment: &Assignment) -> ConflictDetail {
    ConflictDetail {
        kind,
        date: peer.date,
        room_id: assignment.room_id.clone(),
        start_time: peer.start_time,
        end_time: peer.end_time,
        course_title: assignment.course_title.clone(),
        teacher_name: assignment.teacher_name.clone(),
        student_name: assignment.student_name.clone(),
    }
}

/// Detail for an availability violation on the candidate itself.
fn candidate_detail(
    kind: ConflictKind,
    slot: &CandidateSlot,
    assignment: &Assignment,
) -> ConflictDetail {
    ConflictDetail {
        kind,
        date: slot.date,
        room_id: assignment.room_id.clone(),
        start_time: slot.start_time,
        end_time: slot.end_time,
        course_title: assignment.course_title.clone(),
        teacher_name: assignment.teacher_name.clone(),
        student_name: assignment.student_name.clone(),
    }
}
