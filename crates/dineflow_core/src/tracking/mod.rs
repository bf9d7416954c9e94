//! Order status tracking for customer and kitchen views.
//!
//! # Responsibility
//! - Map status labels to display steps, with a sentinel for cancellation.
//! - Guard backend status transitions.
//! - Poll an order's status at a fixed interval with explicit teardown.

pub mod poller;
pub mod status;
