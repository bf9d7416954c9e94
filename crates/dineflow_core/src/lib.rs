//! Core domain logic for DineFlow ordering.
//! This crate is the single source of truth for cart, pricing, menu and
//! order-status invariants; the FFI, server and CLI crates only adapt it.

pub mod cart;
pub mod catalog;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod tracking;

pub use cart::pricing::{price_cart, PriceBook, PricingError, PricingPolicy, UnitPrice};
pub use cart::state::{Cart, CartError, CartLine, MAX_LINE_QUANTITY};
pub use catalog::filter::{filter_items, flatten_menu, MenuFilter, PriceSort};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::menu::{
    CategoryId, ItemId, Menu, MenuCategory, MenuId, MenuItem, MenuItemPatch, NewMenuItem,
};
pub use model::money::{CartTotals, Money};
pub use model::offer::{Discount, Offer, OfferId, OfferTarget};
pub use model::order::{Order, OrderId, OrderLine, OrderStatus, UnknownStatus};
pub use model::restaurant::{Restaurant, RestaurantId};
pub use model::validation::ValidationError;
pub use repo::order_repo::OrderListQuery;
pub use repo::shared::{RepoError, RepoResult};
pub use service::menu_service::{MenuService, MenuServiceError, SqliteMenuService};
pub use service::offer_service::{OfferService, OfferServiceError, SqliteOfferService};
pub use service::order_service::{OrderService, OrderServiceError, SqliteOrderService};
pub use service::restaurant_service::{RestaurantService, SqliteRestaurantService};
pub use tracking::poller::{normalize_poll_interval, PollEvent, PollHandle, StatusPoller};
pub use tracking::status::{can_transition, status_step, step_of, StatusStep, ORDER_STEPS};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
