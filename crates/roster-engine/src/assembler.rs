//! Schedule assembly — expands a class option, attaches the resource
//! assignment to every slot, and annotates each row with the conflicts found.
//!
//! Conflicted rows are never dropped: they come back with a warning so the
//! caller can re-assign the room or teacher, or proceed deliberately.

use crate::availability::{AvailabilityPolicy, TeacherCalendar};
use crate::conflict::{detect_conflicts, BookingSnapshot, ConflictDetail};
use crate::error::Result;
use crate::expander::{expand, CandidateSlot, CapacityShortfall, ClassOption};
use crate::session::{Assignment, ScheduleRow, SessionStatus};

/// The full result of one assembly run.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledSchedule {
    /// One row per expanded slot, in date order, warnings populated where
    /// conflicts exist.
    pub rows: Vec<ScheduleRow>,
    /// Every conflict found across the batch, in row order.
    pub conflicts: Vec<ConflictDetail>,
    /// Present when a weekly run could not reach its class limit.
    pub shortfall: Option<CapacityShortfall>,
}

/// Build the dated schedule for one purchased class option.
///
/// Expands the recurrence once, then checks every slot against the shared
/// committed-state snapshot, the teacher's calendar, and its sibling slots.
/// Returns a validation error only for bad input; conflicts and capacity
/// shortfall are data in the result.
pub fn assemble(
    option: &ClassOption,
    assignment: &Assignment,
    snapshot: &BookingSnapshot,
    calendar: &TeacherCalendar,
    policy: AvailabilityPolicy,
) -> Result<AssembledSchedule> {
    let expansion = expand(&option.recurrence, &option.scope(), option.class_limit)?;

    let mut rows = Vec::with_capacity(expansion.slots.len());
    let mut conflicts = Vec::new();

    for (i, slot) in expansion.slots.iter().enumerate() {
        let peers: Vec<CandidateSlot> = expansion
            .slots
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, s)| *s)
            .collect();

        let found = detect_conflicts(slot, assignment, snapshot, &peers, calendar, policy);
        rows.push(build_row(slot, assignment, summarize(&found)));
        conflicts.extend(found);
    }

    Ok(AssembledSchedule {
        rows,
        conflicts,
        shortfall: expansion.shortfall,
    })
}

fn build_row(slot: &CandidateSlot, assignment: &Assignment, warning: Option<String>) -> ScheduleRow {
    ScheduleRow {
        date: slot.date,
        start_time: slot.start_time,
        end_time: slot.end_time,
        student_id: assignment.student_id.clone(),
        student_name: assignment.student_name.clone(),
        teacher_id: assignment.teacher_id.clone(),
        teacher_name: assignment.teacher_name.clone(),
        room_id: assignment.room_id.clone(),
        room_name: assignment.room_name.clone(),
        course_id: assignment.course_id.clone(),
        course_title: assignment.course_title.clone(),
        status: SessionStatus::Scheduled,
        remark: assignment.remark.clone(),
        warning,
    }
}

/// Join the distinct conflict kinds into the row warning, first occurrence
/// order.
fn summarize(conflicts: &[ConflictDetail]) -> Option<String> {
    if conflicts.is_empty() {
        return None;
    }
    let mut labels: Vec<&'static str> = Vec::new();
    for conflict in conflicts {
        let label = conflict.kind.label();
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
    Some(labels.join("; "))
}
