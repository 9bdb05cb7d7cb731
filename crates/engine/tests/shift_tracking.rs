//! Integration tests for shift scheduling and attendance capture.

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

use crewline_core::{AttendanceKind, Event};
use crewline_engine::{ShiftError, ShiftTracker};
use crewline_store::{EntityStore, MemoryBackend};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn march_event(id: i64) -> Event {
    Event {
        id,
        title: "Spring fair".to_string(),
        location: None,
        start_date: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
        end_date: Utc.with_ymd_and_hms(2024, 3, 3, 20, 0, 0).unwrap(),
        personnel_counts: Default::default(),
        assigned_operators: Vec::new(),
        shifts: Vec::new(),
        hourly_rate_cost: None,
        hourly_rate_sell: None,
        gross_hours: None,
        net_hours: None,
    }
}

async fn tracker_with(events: Vec<Event>) -> (Arc<EntityStore>, ShiftTracker) {
    let store = Arc::new(EntityStore::new(Arc::new(MemoryBackend::new())));
    store.save_events(&events).await.unwrap();
    let tracker = ShiftTracker::new(store.clone());
    (store, tracker)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

// ---------------------------------------------------------------------------
// Shifts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shifts_append_in_order_with_fresh_ids() {
    let (store, tracker) = tracker_with(vec![march_event(1)]).await;

    let first = tracker
        .add_shift(1, date(2024, 3, 2), time(9, 0), time(13, 0), None)
        .await
        .expect("first shift");
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].id, 1);

    let second = tracker
        .add_shift(1, date(2024, 3, 1), time(14, 0), time(18, 0), Some(7))
        .await
        .expect("second shift");
    assert_eq!(second.len(), 2);
    assert_eq!(second[1].id, 2);
    assert_eq!(second[1].operator_id, Some(7));

    // Append order is preserved: the earlier-dated shift stays second.
    let stored = &store.load_events().await[0].shifts;
    assert_eq!(stored[0].date, date(2024, 3, 2));
    assert_eq!(stored[1].date, date(2024, 3, 1));
}

#[tokio::test]
async fn shift_outside_the_window_is_rejected() {
    let (store, tracker) = tracker_with(vec![march_event(1)]).await;

    let result = tracker
        .add_shift(1, date(2024, 3, 5), time(9, 0), time(13, 0), None)
        .await;

    assert_matches!(result, Err(ShiftError::OutOfRange { .. }));
    assert!(store.load_events().await[0].shifts.is_empty());
}

#[tokio::test]
async fn window_bounds_accept_shifts_regardless_of_time_of_day() {
    let (_, tracker) = tracker_with(vec![march_event(1)]).await;

    // The event starts at 08:00 and ends at 20:00, but membership is
    // date-only: a midnight-adjacent shift on either bound is valid.
    tracker
        .add_shift(1, date(2024, 3, 1), time(0, 30), time(6, 0), None)
        .await
        .expect("start bound");
    tracker
        .add_shift(1, date(2024, 3, 3), time(21, 0), time(23, 30), None)
        .await
        .expect("end bound");
}

#[tokio::test]
async fn adding_a_shift_to_an_unknown_event_is_not_found() {
    let (_, tracker) = tracker_with(vec![]).await;

    let result = tracker
        .add_shift(1, date(2024, 3, 2), time(9, 0), time(13, 0), None)
        .await;

    assert_matches!(
        result,
        Err(ShiftError::NotFound {
            entity: "event",
            id: 1
        })
    );
}

#[tokio::test]
async fn remove_shift_is_idempotent() {
    let (store, tracker) = tracker_with(vec![march_event(1)]).await;
    tracker
        .add_shift(1, date(2024, 3, 2), time(9, 0), time(13, 0), None)
        .await
        .unwrap();

    tracker.remove_shift(1).await.expect("removal");
    assert!(store.load_events().await[0].shifts.is_empty());

    // Removing the same shift again is not an error.
    tracker.remove_shift(1).await.expect("repeat removal");
}

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

#[tokio::test]
async fn attendance_appends_without_write_time_validation() {
    let (store, tracker) = tracker_with(vec![march_event(1)]).await;

    // A check-out recorded before any check-in is accepted; reconciliation
    // sorts it out at derivation time.
    tracker
        .record_attendance(
            7,
            1,
            AttendanceKind::CheckOut,
            Utc.with_ymd_and_hms(2024, 3, 2, 17, 0, 0).unwrap(),
        )
        .await
        .unwrap();
    tracker
        .record_attendance(
            7,
            1,
            AttendanceKind::CheckIn,
            Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap(),
        )
        .await
        .unwrap();

    let records = store.load_attendance().await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].kind, AttendanceKind::CheckOut);
    assert_eq!(records[1].kind, AttendanceKind::CheckIn);
}
