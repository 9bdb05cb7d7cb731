//! Payroll derivation: gross/net hours, allowances, compensation, revenue,
//! and attendance reconciliation.
//!
//! [`compute_event_payroll`] is deterministic and side-effect-free, so it is
//! safe to re-invoke on every change-bus delivery without debouncing.

use serde::Serialize;

use crate::attendance::{AttendanceKind, AttendanceRecord};
use crate::event::Event;
use crate::types::EntityId;

// ---------------------------------------------------------------------------
// Rate and allowance constants
// ---------------------------------------------------------------------------

/// Hourly cost rate applied when the event does not carry one.
pub const DEFAULT_HOURLY_RATE_COST: f64 = 15.0;

/// Hourly sell rate applied when the event does not carry one.
pub const DEFAULT_HOURLY_RATE_SELL: f64 = 25.0;

/// Gross hours above which the unpaid break is deducted and the meal
/// allowance is granted.
pub const BREAK_THRESHOLD_HOURS: f64 = 5.0;

/// Length of the unpaid break deducted from long shifts.
pub const UNPAID_BREAK_HOURS: f64 = 1.0;

/// Meal allowance granted on shifts longer than the break threshold.
pub const MEAL_ALLOWANCE: f64 = 10.0;

/// Flat travel allowance granted on every event.
pub const TRAVEL_ALLOWANCE: f64 = 15.0;

/// Seconds per hour (3600.0).
pub const SECS_PER_HOUR: f64 = 3600.0;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Outcome of attendance reconciliation for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
}

/// Derived payroll figures for one event.
#[derive(Debug, Clone, Serialize)]
pub struct PayrollCalculation {
    pub gross_hours: f64,
    pub net_hours: f64,
    pub hourly_rate_cost: f64,
    pub hourly_rate_sell: f64,
    pub compensation: f64,
    pub revenue: f64,
    pub meal_allowance: f64,
    pub travel_allowance: f64,
    /// `Present` as soon as any check-in exists for the event.
    pub attendance: Option<AttendanceStatus>,
    /// Elapsed hours between the latest check-in/check-out pair, when both
    /// directions exist.
    pub actual_hours: Option<f64>,
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Round to one decimal place, half away from zero.
fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Compute the full payroll breakdown for one event.
///
/// Gross hours come from the event's stored override when present, otherwise
/// from the schedule window. Net hours deduct the unpaid break on shifts
/// longer than [`BREAK_THRESHOLD_HOURS`]. Attendance records not belonging to
/// this event are ignored.
pub fn compute_event_payroll(event: &Event, attendance: &[AttendanceRecord]) -> PayrollCalculation {
    let gross_hours = event.gross_hours.unwrap_or_else(|| {
        round_tenth((event.end_date - event.start_date).num_seconds() as f64 / SECS_PER_HOUR)
    });

    let net_hours = event.net_hours.unwrap_or(if gross_hours > BREAK_THRESHOLD_HOURS {
        gross_hours - UNPAID_BREAK_HOURS
    } else {
        gross_hours
    });

    let hourly_rate_cost = event.hourly_rate_cost.unwrap_or(DEFAULT_HOURLY_RATE_COST);
    let hourly_rate_sell = event.hourly_rate_sell.unwrap_or(DEFAULT_HOURLY_RATE_SELL);

    let (attendance_status, actual_hours) = reconcile_attendance(event.id, attendance);

    PayrollCalculation {
        gross_hours,
        net_hours,
        hourly_rate_cost,
        hourly_rate_sell,
        compensation: net_hours * hourly_rate_cost,
        revenue: net_hours * hourly_rate_sell,
        meal_allowance: if gross_hours > BREAK_THRESHOLD_HOURS {
            MEAL_ALLOWANCE
        } else {
            0.0
        },
        travel_allowance: TRAVEL_ALLOWANCE,
        attendance: attendance_status,
        actual_hours,
    }
}

/// Reconcile the latest check-in/check-out pair recorded for `event_id`.
///
/// Tolerates missing or out-of-order records: a lone check-in still counts
/// as present, and actual hours are derived only when both directions exist.
fn reconcile_attendance(
    event_id: EntityId,
    records: &[AttendanceRecord],
) -> (Option<AttendanceStatus>, Option<f64>) {
    let latest = |kind: AttendanceKind| {
        records
            .iter()
            .filter(|r| r.event_id == event_id && r.kind == kind)
            .map(|r| r.timestamp)
            .max()
    };

    match (latest(AttendanceKind::CheckIn), latest(AttendanceKind::CheckOut)) {
        (Some(check_in), Some(check_out)) => (
            Some(AttendanceStatus::Present),
            Some(round_tenth(
                (check_out - check_in).num_seconds() as f64 / SECS_PER_HOUR,
            )),
        ),
        (Some(_), None) => (Some(AttendanceStatus::Present), None),
        _ => (None, None),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
