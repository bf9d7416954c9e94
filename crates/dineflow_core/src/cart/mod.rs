//! Client-side cart state and pricing.
//!
//! # Responsibility
//! - Hold the ephemeral item -> quantity mapping a customer builds up.
//! - Price a cart against a price book and a pricing policy.
//!
//! # Invariants
//! - A cart never stores a zero quantity; the key is removed instead.
//! - Pricing is pure: the same cart, book and policy always give the same totals.

pub mod pricing;
pub mod state;
