//! Event domain model: schedule window, personnel requirements, shifts.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::operator::OperatorRef;
use crate::types::{EntityId, Timestamp};

// ---------------------------------------------------------------------------
// Shift
// ---------------------------------------------------------------------------

/// A scheduled work interval within an event's date range.
///
/// Shifts live inside their owning [`Event`] in append order; append order is
/// the display order and is never re-sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub id: EntityId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Operator covering the shift, when one has been picked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<EntityId>,
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A client engagement with a schedule window and personnel requirements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EntityId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    /// Required headcount per personnel category.
    #[serde(default)]
    pub personnel_counts: BTreeMap<String, u32>,
    /// Operator snapshots forming the event side of the assignment relation.
    #[serde(default)]
    pub assigned_operators: Vec<OperatorRef>,
    #[serde(default)]
    pub shifts: Vec<Shift>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate_sell: Option<f64>,
    /// Precomputed override; when absent, gross hours derive from the window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_hours: Option<f64>,
}

impl Event {
    /// Date-only window membership: both bounds normalized to midnight,
    /// time of day ignored.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date.date_naive() && date <= self.end_date.date_naive()
    }

    /// Whether the event-side relation holds an entry for `operator_id`.
    pub fn has_operator(&self, operator_id: EntityId) -> bool {
        self.assigned_operators.iter().any(|r| r.id == operator_id)
    }
}

// ---------------------------------------------------------------------------
// Id allocation
// ---------------------------------------------------------------------------

/// Allocate the next event id: one past the current maximum, starting at 1.
pub fn next_event_id(events: &[Event]) -> EntityId {
    events.iter().map(|e| e.id).max().unwrap_or(0) + 1
}

/// Allocate the next shift id within one event's shift list.
pub fn next_shift_id(shifts: &[Shift]) -> EntityId {
    shifts.iter().map(|s| s.id).max().unwrap_or(0) + 1
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event_spanning(start: (i32, u32, u32), end: (i32, u32, u32)) -> Event {
        Event {
            id: 1,
            title: "Expo".to_string(),
            location: None,
            start_date: Utc
                .with_ymd_and_hms(start.0, start.1, start.2, 10, 30, 0)
                .unwrap(),
            end_date: Utc.with_ymd_and_hms(end.0, end.1, end.2, 18, 0, 0).unwrap(),
            personnel_counts: BTreeMap::new(),
            assigned_operators: Vec::new(),
            shifts: Vec::new(),
            hourly_rate_cost: None,
            hourly_rate_sell: None,
            gross_hours: None,
            net_hours: None,
        }
    }

    #[test]
    fn window_membership_is_date_only_and_inclusive() {
        let event = event_spanning((2024, 3, 1), (2024, 3, 3));

        // Both bounds count even though the event starts at 10:30.
        assert!(event.contains_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert!(event.contains_date(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()));
        assert!(event.contains_date(NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()));

        assert!(!event.contains_date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert!(!event.contains_date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()));
    }

    #[test]
    fn next_event_id_is_max_plus_one() {
        assert_eq!(next_event_id(&[]), 1);
        let mut a = event_spanning((2024, 1, 1), (2024, 1, 2));
        a.id = 5;
        let mut b = event_spanning((2024, 1, 1), (2024, 1, 2));
        b.id = 2;
        assert_eq!(next_event_id(&[a, b]), 6);
    }

    #[test]
    fn next_shift_id_is_scoped_to_the_event() {
        let shifts = vec![
            Shift {
                id: 3,
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                operator_id: None,
            },
            Shift {
                id: 1,
                date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
                operator_id: Some(7),
            },
        ];
        assert_eq!(next_shift_id(&shifts), 4);
        assert_eq!(next_shift_id(&[]), 1);
    }

    #[test]
    fn has_operator_matches_by_id() {
        let mut event = event_spanning((2024, 3, 1), (2024, 3, 3));
        event.assigned_operators.push(OperatorRef {
            id: 7,
            name: "Ada Moretti".to_string(),
            email: "ada@example.com".to_string(),
        });
        assert!(event.has_operator(7));
        assert!(!event.has_operator(8));
    }
}
