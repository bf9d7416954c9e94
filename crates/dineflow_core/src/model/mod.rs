//! Domain model for restaurants, menus, offers and orders.
//!
//! # Responsibility
//! - Define the canonical records shared by repo, service and FFI layers.
//! - Own record-level validation that every write path must pass.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID v4.
//! - Money is always integer minor units, never floating point.

pub mod menu;
pub mod money;
pub mod offer;
pub mod order;
pub mod restaurant;
pub mod validation;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in Unix epoch milliseconds.
///
/// Falls back to `0` if the system clock reports a time before the epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
