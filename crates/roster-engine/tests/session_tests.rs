//! Tests for session lifecycle — cancel and reschedule preserve history.

use chrono::{NaiveDate, NaiveTime};
use roster_engine::{ScheduleRow, SessionStatus, ValidationError};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn row() -> ScheduleRow {
    ScheduleRow {
        date: d(2024, 3, 1),
        start_time: t(9, 0),
        end_time: t(10, 0),
        student_id: "s-1".to_string(),
        student_name: "Alice Wong".to_string(),
        teacher_id: "t-1".to_string(),
        teacher_name: "Ms Tan".to_string(),
        room_id: "r-5".to_string(),
        room_name: "Room 5".to_string(),
        course_id: "c-1".to_string(),
        course_title: "Phonics".to_string(),
        status: SessionStatus::Scheduled,
        remark: None,
        warning: Some("room double booking".to_string()),
    }
}

#[test]
fn cancel_frees_the_slot() {
    let mut session = row();
    assert!(session.occupies());

    session.cancel();
    assert_eq!(session.status, SessionStatus::Cancelled);
    assert!(!session.occupies());
}

#[test]
fn attended_sessions_still_occupy() {
    let mut session = row();
    session.status = SessionStatus::Attended;
    assert!(session.occupies());
}

#[test]
fn reschedule_cancels_the_original_and_returns_a_fresh_row() {
    let mut original = row();
    let moved = original
        .reschedule(d(2024, 3, 8), t(14, 0), t(15, 0))
        .expect("reschedule should succeed");

    // The original stays in history, cancelled.
    assert_eq!(original.status, SessionStatus::Cancelled);
    assert_eq!(original.date, d(2024, 3, 1));

    // The new row is scheduled at the new slot with the same resources,
    // and has not been conflict-checked yet.
    assert_eq!(moved.status, SessionStatus::Scheduled);
    assert_eq!(moved.date, d(2024, 3, 8));
    assert_eq!(moved.start_time, t(14, 0));
    assert_eq!(moved.end_time, t(15, 0));
    assert_eq!(moved.teacher_id, "t-1");
    assert_eq!(moved.student_name, "Alice Wong");
    assert!(moved.warning.is_none());
}

#[test]
fn reschedule_to_an_inverted_window_is_rejected() {
    let mut original = row();
    let result = original.reschedule(d(2024, 3, 8), t(15, 0), t(14, 0));

    assert!(matches!(
        result,
        Err(ValidationError::EmptyTimeWindow { .. })
    ));
    // A failed reschedule must not touch the original.
    assert_eq!(original.status, SessionStatus::Scheduled);
}
