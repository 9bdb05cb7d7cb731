//! Crewline scheduling engine.
//!
//! The mutating services of the workspace plus the projection refresher:
//!
//! - [`AssignmentManager`] — the only mutator of the bidirectional
//!   Operator↔Event relation; enforces referential consistency across both
//!   collections.
//! - [`ShiftTracker`] — shift scheduling inside an event's window and
//!   append-only attendance capture.
//! - [`ProjectionRefresher`] — recomputes payroll and staffing KPIs from a
//!   fresh snapshot on every change-bus delivery.

pub mod assignment;
pub mod projections;
pub mod shifts;

pub use assignment::{AssignmentError, AssignmentManager};
pub use projections::{snapshot_derived, EventDerived, ProjectionRefresher};
pub use shifts::{ShiftError, ShiftTracker};
