//! Operator domain model and the operator side of the assignment relation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::EntityId;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Whether an operator can currently be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorStatus {
    Active,
    Inactive,
}

// ---------------------------------------------------------------------------
// Operator
// ---------------------------------------------------------------------------

/// A staff member assignable to events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operator {
    pub id: EntityId,
    pub name: String,
    pub surname: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub status: OperatorStatus,
    /// Ids of the events this operator is assigned to.
    ///
    /// A `BTreeSet` so duplicate entries are structurally impossible and
    /// serialized order is stable.
    #[serde(default)]
    pub assigned_events: BTreeSet<EntityId>,
}

impl Operator {
    /// Full display name used in notifications and event-side snapshots.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

// ---------------------------------------------------------------------------
// OperatorRef
// ---------------------------------------------------------------------------

/// Lightweight operator reference stored on the event side of the relation.
///
/// Carries a snapshot of name and email taken at assignment time so rosters
/// and notifications can render without resolving the full operator record.
/// The snapshot can go stale after a profile edit; the id is the
/// authoritative link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorRef {
    pub id: EntityId,
    pub name: String,
    pub email: String,
}

impl From<&Operator> for OperatorRef {
    fn from(operator: &Operator) -> Self {
        Self {
            id: operator.id,
            name: operator.display_name(),
            email: operator.email.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Id allocation
// ---------------------------------------------------------------------------

/// Allocate the next operator id: one past the current maximum, starting at 1.
pub fn next_operator_id(operators: &[Operator]) -> EntityId {
    operators.iter().map(|o| o.id).max().unwrap_or(0) + 1
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
