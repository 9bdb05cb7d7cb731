//! Crewline change bus and notification infrastructure.
//!
//! Building blocks for propagating every mutation to all views of the same
//! data:
//!
//! - [`ChangeBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, with one typed [`Topic`] per collection plus
//!   the assignment-changed topic.
//! - [`ChangeEvent`] — the canonical change envelope.
//! - [`StorageBridge`] — background task that maps raw storage watch
//!   notifications onto bus topics, giving every open context an identical
//!   view of remote writes.
//! - [`delivery`] — external delivery channel for operator notifications
//!   (SMTP).

pub mod bridge;
pub mod bus;
pub mod delivery;

pub use bridge::StorageBridge;
pub use bus::{ChangeBus, ChangeEvent, Topic};
pub use delivery::email::{
    AssignmentNotification, EmailConfig, NotificationKind, OperatorNotifier,
};
