//! Append-only attendance observations.

use serde::{Deserialize, Serialize};

use crate::types::{EntityId, Timestamp};

/// Direction of an attendance observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceKind {
    CheckIn,
    CheckOut,
}

/// A timestamped check-in/check-out observation for an operator at an event.
///
/// Records are append-only; no ordering between check-in and check-out is
/// enforced at write time. Reconciliation reads the latest pair per event
/// and tolerates missing or out-of-order records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub operator_id: EntityId,
    pub event_id: EntityId,
    pub kind: AttendanceKind,
    pub timestamp: Timestamp,
}
