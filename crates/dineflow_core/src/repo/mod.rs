//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must run record `validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `StaleStatus`) in
//!   addition to DB transport errors.
//! - Repositories borrow a shared `&Connection`; multi-statement writes use
//!   an unchecked transaction on that borrow.

pub mod menu_repo;
pub mod offer_repo;
pub mod order_repo;
pub mod restaurant_repo;
pub mod shared;
