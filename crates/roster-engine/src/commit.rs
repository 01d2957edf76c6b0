//! Commit gate — last-moment re-validation against the freshest committed
//! snapshot before rows are persisted.
//!
//! Persistence belongs to the caller, and the storage layer's own
//! uniqueness/overlap constraint remains the authority; this recheck is the
//! fast-reject path that closes the preview-to-commit race. Each row is an
//! independent, retryable unit of work — one stale row never blocks its
//! siblings.

use crate::conflict::{windows_overlap, BookingSnapshot, ConflictDetail, ConflictKind};
use crate::error::StaleConflict;
use crate::session::ScheduleRow;

/// Re-run the room and teacher double-booking checks for each row against
/// `latest`.
///
/// A collision with a committed row that was already present in `previewed`
/// is not stale — the caller saw it at preview time and decided. Only
/// bookings that landed between preview and commit fail the row, so
/// re-previewing against the current snapshot is the explicit override path.
///
/// Availability is not rechecked here: weekly hours and absences do not
/// change between preview and commit the way bookings do.
pub fn recheck(
    rows: Vec<ScheduleRow>,
    previewed: &BookingSnapshot,
    latest: &BookingSnapshot,
) -> Vec<Result<ScheduleRow, StaleConflict>> {
    rows.into_iter()
        .map(|row| recheck_row(row, previewed, latest))
        .collect()
}

fn recheck_row(
    row: ScheduleRow,
    previewed: &BookingSnapshot,
    latest: &BookingSnapshot,
) -> Result<ScheduleRow, StaleConflict> {
    let seen_at_preview = previewed.on_date(row.date);

    let mut conflicts = Vec::new();
    for committed in latest.on_date(row.date) {
        if !windows_overlap(
            row.start_time,
            row.end_time,
            committed.start_time,
            committed.end_time,
        ) {
            continue;
        }
        if seen_at_preview.contains(committed) {
            continue;
        }
        if committed.room_id == row.room_id {
            conflicts.push(detail(ConflictKind::RoomDoubleBooking, committed));
        }
        if committed.teacher_id == row.teacher_id {
            conflicts.push(detail(ConflictKind::TeacherDoubleBooking, committed));
        }
    }

    if conflicts.is_empty() {
        Ok(row)
    } else {
        Err(StaleConflict {
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            conflicts,
        })
    }
}

fn detail(kind: ConflictKind, row: &ScheduleRow) -> ConflictDetail {
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
