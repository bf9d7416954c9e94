//! Customer-facing menu browsing.
//!
//! # Responsibility
//! - Flatten a menu into display order.
//! - Filter and sort menu items for the browse screen.

pub mod filter;
