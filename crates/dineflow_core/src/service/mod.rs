//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep FFI, server and CLI layers decoupled from storage details.
//!
//! Each service is generic over repository traits; `Sqlite*Service` aliases
//! wire them to one borrowed connection.

pub mod menu_service;
pub mod offer_service;
pub mod order_service;
pub mod restaurant_service;
