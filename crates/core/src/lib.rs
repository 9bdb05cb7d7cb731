//! Crewline domain model and derivation logic.
//!
//! Pure types and functions shared by every other crate in the workspace:
//!
//! - [`operator`] — staff members and the operator side of the assignment
//!   relation.
//! - [`event`] — client engagements: schedule window, personnel
//!   requirements, shifts.
//! - [`attendance`] — append-only check-in/check-out observations.
//! - [`payroll`] — gross/net hours, allowances, compensation and revenue.
//! - [`kpi`] — staffing-completion aggregation.
//!
//! This crate has zero internal dependencies and performs no I/O; everything
//! here is a deterministic function of its inputs.

pub mod attendance;
pub mod event;
pub mod kpi;
pub mod operator;
pub mod payroll;
pub mod types;

pub use attendance::{AttendanceKind, AttendanceRecord};
pub use event::{next_event_id, next_shift_id, Event, Shift};
pub use kpi::{compute_staffing_kpi, StaffingKpi};
pub use operator::{next_operator_id, Operator, OperatorRef, OperatorStatus};
pub use payroll::{compute_event_payroll, AttendanceStatus, PayrollCalculation};
