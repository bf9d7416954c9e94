//! Flutter-facing bindings for the DineFlow core.

pub mod api;
