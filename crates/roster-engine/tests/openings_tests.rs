//! Tests for open-window computation — free gaps for rooms and teachers.

use chrono::{NaiveDate, NaiveTime, Weekday};
use roster_engine::{
    first_opening, room_openings, teacher_openings, Absence, AvailabilityPolicy,
    AvailabilitySlot, BookingSnapshot, ScheduleRow, SessionStatus, TeacherCalendar,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn booked(room: &str, teacher: &str, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> ScheduleRow {
    ScheduleRow {
        date,
        start_time: start,
        end_time: end,
        student_id: "s-1".to_string(),
        student_name: "Alice Wong".to_string(),
        teacher_id: teacher.to_string(),
        teacher_name: "Ms Tan".to_string(),
        room_id: room.to_string(),
        room_name: room.to_string(),
        course_id: "c-1".to_string(),
        course_title: "Phonics".to_string(),
        status: SessionStatus::Scheduled,
        remark: None,
        warning: None,
    }
}

// ── Room openings ───────────────────────────────────────────────────────────

#[test]
fn empty_day_is_one_big_opening() {
    let openings = room_openings(
        &BookingSnapshot::default(),
        "r-5",
        d(2024, 3, 1),
        t(8, 0),
        t(17, 0),
    );

    assert_eq!(openings.len(), 1);
    assert_eq!(openings[0].start_time, t(8, 0));
    assert_eq!(openings[0].end_time, t(17, 0));
    assert_eq!(openings[0].minutes, 540);
}

#[test]
fn bookings_split_the_day_into_gaps() {
    let snapshot = BookingSnapshot::new(vec![
        booked("r-5", "t-1", d(2024, 3, 1), t(9, 0), t(10, 0)),
        booked("r-5", "t-2", d(2024, 3, 1), t(14, 0), t(15, 0)),
    ]);

    let openings = room_openings(&snapshot, "r-5", d(2024, 3, 1), t(8, 0), t(17, 0));

    // 08-09, 10-14, 15-17.
    assert_eq!(openings.len(), 3);
    assert_eq!(openings[0].minutes, 60);
    assert_eq!(openings[1].minutes, 240);
    assert_eq!(openings[2].minutes, 120);
}

#[test]
fn overlapping_bookings_merge_before_gap_computation() {
    let snapshot = BookingSnapshot::new(vec![
        booked("r-5", "t-1", d(2024, 3, 1), t(9, 0), t(11, 0)),
        booked("r-5", "t-2", d(2024, 3, 1), t(10, 0), t(12, 0)),
    ]);

    let openings = room_openings(&snapshot, "r-5", d(2024, 3, 1), t(8, 0), t(17, 0));

    // 08-09 and 12-17 only.
    assert_eq!(openings.len(), 2);
    assert_eq!(openings[0].end_time, t(9, 0));
    assert_eq!(openings[1].start_time, t(12, 0));
}

#[test]
fn other_rooms_do_not_shrink_the_openings() {
    let snapshot = BookingSnapshot::new(vec![booked(
        "r-2",
        "t-1",
        d(2024, 3, 1),
        t(9, 0),
        t(16, 0),
    )]);

    let openings = room_openings(&snapshot, "r-5", d(2024, 3, 1), t(8, 0), t(17, 0));
    assert_eq!(openings.len(), 1);
    assert_eq!(openings[0].minutes, 540);
}

#[test]
fn cancelled_bookings_free_their_slot() {
    let mut row = booked("r-5", "t-1", d(2024, 3, 1), t(9, 0), t(16, 0));
    row.cancel();
    let snapshot = BookingSnapshot::new(vec![row]);

    let openings = room_openings(&snapshot, "r-5", d(2024, 3, 1), t(8, 0), t(17, 0));
    assert_eq!(openings.len(), 1);
}

#[test]
fn booking_spanning_the_window_edge_is_clipped() {
    let snapshot = BookingSnapshot::new(vec![booked(
        "r-5",
        "t-1",
        d(2024, 3, 1),
        t(7, 0),
        t(9, 0),
    )]);

    let openings = room_openings(&snapshot, "r-5", d(2024, 3, 1), t(8, 0), t(17, 0));
    assert_eq!(openings.len(), 1);
    assert_eq!(openings[0].start_time, t(9, 0));
}

#[test]
fn inverted_query_window_yields_nothing() {
    let openings = room_openings(
        &BookingSnapshot::default(),
        "r-5",
        d(2024, 3, 1),
        t(17, 0),
        t(8, 0),
    );
    assert!(openings.is_empty());
}

// ── Teacher openings ────────────────────────────────────────────────────────

#[test]
fn absent_teacher_has_no_openings() {
    let calendar = TeacherCalendar {
        teacher_id: "t-1".to_string(),
        slots: vec![],
        absences: vec![Absence {
            date: d(2024, 3, 1),
            reason: None,
        }],
    };

    let openings = teacher_openings(
        &BookingSnapshot::default(),
        &calendar,
        d(2024, 3, 1),
        t(8, 0),
        t(17, 0),
        AvailabilityPolicy::Permissive,
    );
    assert!(openings.is_empty());
}

#[test]
fn weekly_slots_clip_the_gaps() {
    // 2024-03-04 is a Monday. The teacher works 09:00-12:00 and has a
    // booking 10:00-11:00 inside it.
    let calendar = TeacherCalendar {
        teacher_id: "t-1".to_string(),
        slots: vec![AvailabilitySlot {
            weekday: Weekday::Mon,
            start_time: t(9, 0),
            end_time: t(12, 0),
        }],
        absences: vec![],
    };
    let snapshot = BookingSnapshot::new(vec![booked(
        "r-5",
        "t-1",
        d(2024, 3, 4),
        t(10, 0),
        t(11, 0),
    )]);

    let openings = teacher_openings(
        &snapshot,
        &calendar,
        d(2024, 3, 4),
        t(8, 0),
        t(17, 0),
        AvailabilityPolicy::Permissive,
    );

    // 09-10 and 11-12; nothing outside the configured slot.
    assert_eq!(openings.len(), 2);
    assert_eq!((openings[0].start_time, openings[0].end_time), (t(9, 0), t(10, 0)));
    assert_eq!((openings[1].start_time, openings[1].end_time), (t(11, 0), t(12, 0)));
}

#[test]
fn no_slots_permissive_exposes_all_free_time() {
    let calendar = TeacherCalendar::empty("t-1".to_string());
    let snapshot = BookingSnapshot::new(vec![booked(
        "r-5",
        "t-1",
        d(2024, 3, 1),
        t(9, 0),
        t(10, 0),
    )]);

    let openings = teacher_openings(
        &snapshot,
        &calendar,
        d(2024, 3, 1),
        t(8, 0),
        t(12, 0),
        AvailabilityPolicy::Permissive,
    );

    assert_eq!(openings.len(), 2);
}

#[test]
fn no_slots_strict_has_no_openings() {
    let calendar = TeacherCalendar::empty("t-1".to_string());

    let openings = teacher_openings(
        &BookingSnapshot::default(),
        &calendar,
        d(2024, 3, 1),
        t(8, 0),
        t(12, 0),
        AvailabilityPolicy::Strict,
    );
    assert!(openings.is_empty());
}

#[test]
fn another_teachers_bookings_do_not_count() {
    let calendar = TeacherCalendar::empty("t-1".to_string());
    let snapshot = BookingSnapshot::new(vec![booked(
        "r-5",
        "t-9",
        d(2024, 3, 1),
        t(8, 0),
        t(12, 0),
    )]);

    let openings = teacher_openings(
        &snapshot,
        &calendar,
        d(2024, 3, 1),
        t(8, 0),
        t(12, 0),
        AvailabilityPolicy::Permissive,
    );
    assert_eq!(openings.len(), 1);
    assert_eq!(openings[0].minutes, 240);
}

// ── first_opening ───────────────────────────────────────────────────────────

#[test]
fn first_opening_respects_minimum_duration() {
    let snapshot = BookingSnapshot::new(vec![
        booked("r-5", "t-1", d(2024, 3, 1), t(8, 30), t(10, 0)),
        booked("r-5", "t-1", d(2024, 3, 1), t(11, 0), t(14, 0)),
    ]);
    let openings = room_openings(&snapshot, "r-5", d(2024, 3, 1), t(8, 0), t(17, 0));

    // Gaps: 08:00-08:30 (30 min), 10:00-11:00 (60 min), 14:00-17:00 (180 min).
    let slot = first_opening(&openings, 90).expect("a 90-minute gap exists");
    assert_eq!(slot.start_time, t(14, 0));

    assert!(first_opening(&openings, 240).is_none());
}
