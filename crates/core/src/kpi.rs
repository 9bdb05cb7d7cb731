//! Staffing-completion KPI aggregation.

use serde::Serialize;

use crate::event::Event;
use crate::operator::Operator;

/// Staffing-completion figures for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StaffingKpi {
    /// Operators whose assignment set currently references the event.
    pub assigned: u32,
    /// Sum of required headcounts across personnel categories.
    pub required: u32,
    /// `assigned / required` as a rounded percentage; 0 when nothing is
    /// required.
    pub percentage: u32,
}

/// Aggregate staffing completion for `event` from an operator snapshot.
///
/// `assigned` is recomputed from the operator side on every call rather than
/// cached, so it always agrees with the assignment manager's last write.
pub fn compute_staffing_kpi(event: &Event, operators: &[Operator]) -> StaffingKpi {
    let assigned = operators
        .iter()
        .filter(|o| o.assigned_events.contains(&event.id))
        .count() as u32;

    let required: u32 = event.personnel_counts.values().sum();

    let percentage = if required > 0 {
        ((assigned as f64 / required as f64) * 100.0).round() as u32
    } else {
        0
    };

    StaffingKpi {
        assigned,
        required,
        percentage,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
