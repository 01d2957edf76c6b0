//! Open-window computation — where a room or teacher still has free time on
//! a date.
//!
//! Merges a resource's busy windows (committed, non-cancelled rows), clips
//! them to a query window, and returns the gaps. Used to propose alternative
//! slots for conflicted rows.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::availability::{AvailabilityPolicy, TeacherCalendar};
use crate::conflict::BookingSnapshot;

/// A bookable gap on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenWindow {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub minutes: i64,
}

/// Open windows for a room within `[window_start, window_end)` on `date`.
pub fn room_openings(
    snapshot: &BookingSnapshot,
    room_id: &str,
    date: NaiveDate,
    window_start: NaiveTime,
    window_end: NaiveTime,
) -> Vec<OpenWindow> {
    if window_start >= window_end {
        return Vec::new();
    }
    let busy = clipped_busy(snapshot, date, window_start, window_end, |room, _| {
        room == room_id
    });
    gaps(&merge_busy(busy), window_start, window_end)
}

/// Open windows for a teacher within `[window_start, window_end)` on `date`.
///
/// An absence on the date means no openings at all. When the teacher has
/// configured weekly slots, gaps are clipped to that weekday's slots; with no
/// slots configured, the policy decides between the whole free time
/// (permissive) and nothing (strict).
pub fn teacher_openings(
    snapshot: &BookingSnapshot,
    calendar: &TeacherCalendar,
    date: NaiveDate,
    window_start: NaiveTime,
    window_end: NaiveTime,
    policy: AvailabilityPolicy,
) -> Vec<OpenWindow> {
    if window_start >= window_end {
        return Vec::new();
    }
    if calendar.absence_on(date).is_some() {
        return Vec::new();
    }

    let busy = clipped_busy(snapshot, date, window_start, window_end, |_, teacher| {
        teacher == calendar.teacher_id
    });
    let free = gaps(&merge_busy(busy), window_start, window_end);

    if calendar.slots.is_empty() {
        return match policy {
            AvailabilityPolicy::Permissive => free,
            AvailabilityPolicy::Strict => Vec::new(),
        };
    }

    let weekday = date.weekday();
    let mut clipped = Vec::new();
    for gap in &free {
        for slot in calendar.slots.iter().filter(|s| s.weekday == weekday) {
            let start = gap.start_time.max(slot.start_time);
            let end = gap.end_time.min(slot.end_time);
            if start < end {
                clipped.push(window(start, end));
            }
        }
    }
    clipped.sort_by_key(|w| (w.start_time, w.end_time));
    clipped
}

/// The first open window of at least `min_minutes`.
pub fn first_opening(openings: &[OpenWindow], min_minutes: i64) -> Option<OpenWindow> {
    openings.iter().copied().find(|w| w.minutes >= min_minutes)
}

/// Busy intervals for one resource on `date`, clipped to the query window.
/// `matches` receives `(room_id, teacher_id)` of each committed row.
fn clipped_busy(
    snapshot: &BookingSnapshot,
    date: NaiveDate,
    window_start: NaiveTime,
    window_end: NaiveTime,
    matches: impl Fn(&str, &str) -> bool,
) -> Vec<(NaiveTime, NaiveTime)> {
    snapshot
        .on_date(date)
        .iter()
        .filter(|row| matches(&row.room_id, &row.teacher_id))
        .filter(|row| row.start_time < window_end && row.end_time > window_start)
        .map(|row| {
            (
                row.start_time.max(window_start),
                row.end_time.min(window_end),
            )
        })
        .collect()
}

/// Merge overlapping or adjacent busy intervals into a sorted,
/// non-overlapping list.
fn merge_busy(mut intervals: Vec<(NaiveTime, NaiveTime)>) -> Vec<(NaiveTime, NaiveTime)> {
    intervals.sort_by_key(|&(start, end)| (start, end));

    let mut merged: Vec<(NaiveTime, NaiveTime)> = Vec::new();
    for (start, end) in intervals {
        if let Some(last) = merged.last_mut() {
            if start <= last.1 {
                last.1 = last.1.max(end);
                continue;
            }
        }
        merged.push((start, end));
    }
    merged
}

/// The gaps between merged busy intervals within the query window.
fn gaps(
    merged: &[(NaiveTime, NaiveTime)],
    window_start: NaiveTime,
    window_end: NaiveTime,
) -> Vec<OpenWindow> {
    let mut open = Vec::new();
    let mut cursor = window_start;

    for &(busy_start, busy_end) in merged {
        if cursor < busy_start {
            open.push(window(cursor, busy_start));
        }
        cursor = cursor.max(busy_end);
    }

    if cursor < window_end {
        open.push(window(cursor, window_end));
    }
    open
}

fn window(start: NaiveTime, end: NaiveTime) -> OpenWindow {
    OpenWindow {
        start_time: start,
        end_time: end,
        minutes: (end - start).num_minutes(),
    }
}
