//! External delivery channels for operator notifications.
//!
//! Delivery is best-effort by contract: a failed dispatch is logged and
//! surfaced as a warning, never rolled back against the local mutation that
//! triggered it.

pub mod email;
