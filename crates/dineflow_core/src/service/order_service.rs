//! Checkout and kitchen use-cases.
//!
//! # Responsibility
//! - Price carts against the live menu and active offers.
//! - Place orders from a cart, snapshotting names and unit prices.
//! - Drive status changes for the kitchen and report progress steps.
//!
//! # Invariants
//! - Orders are only placed with open restaurants and available items of
//!   that restaurant's menu.
//! - Status changes obey `can_transition` and are written compare-and-set.

use crate::cart::pricing::{price_cart, PricingError, PricingPolicy};
use crate::cart::state::Cart;
use crate::model::menu::{ItemId, Menu, MenuItem};
use crate::model::money::CartTotals;
use crate::model::order::{Order, OrderId, OrderLine, OrderStatus};
use crate::model::restaurant::{Restaurant, RestaurantId};
use crate::model::validation::ValidationError;
use crate::repo::menu_repo::{MenuRepository, SqliteMenuRepository};
use crate::repo::offer_repo::{OfferRepository, SqliteOfferRepository};
use crate::repo::order_repo::{OrderListQuery, OrderRepository, SqliteOrderRepository};
use crate::repo::restaurant_repo::{RestaurantRepository, SqliteRestaurantRepository};
use crate::repo::shared::{RepoError, RepoResult};
use crate::service::offer_service::build_price_book;
use crate::tracking::status::{can_transition, step_of, StatusStep};
use log::{info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum OrderServiceError {
    RestaurantNotFound(RestaurantId),
    RestaurantClosed(RestaurantId),
    MenuNotFound(RestaurantId),
    EmptyCart,
    /// Item is not on the restaurant's menu.
    UnknownItem(ItemId),
    ItemUnavailable(ItemId),
    Pricing(PricingError),
    OrderNotFound(OrderId),
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for OrderServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RestaurantNotFound(id) => write!(f, "restaurant not found: {id}"),
            Self::RestaurantClosed(id) => write!(f, "restaurant is closed: {id}"),
            Self::MenuNotFound(id) => write!(f, "menu not found: restaurant {id}"),
            Self::EmptyCart => write!(f, "cart is empty"),
            Self::UnknownItem(id) => write!(f, "item is not on this menu: {id}"),
            Self::ItemUnavailable(id) => write!(f, "item is unavailable: {id}"),
            Self::Pricing(err) => write!(f, "{err}"),
            Self::OrderNotFound(id) => write!(f, "order not found: {id}"),
            Self::InvalidTransition { from, to } => {
                write!(f, "invalid status transition: {from} -> {to}")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for OrderServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Pricing(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for OrderServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound {
                entity: "order",
                id,
            } => Self::OrderNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<PricingError> for OrderServiceError {
    fn from(value: PricingError) -> Self {
        match value {
            PricingError::UnknownItem(id) => Self::UnknownItem(id),
            other => Self::Pricing(other),
        }
    }
}

/// Order service facade over the order, menu, offer and restaurant repositories.
pub struct OrderService<Q, M, O, R>
where
    Q: OrderRepository,
    M: MenuRepository,
    O: OfferRepository,
    R: RestaurantRepository,
{
    orders: Q,
    menus: M,
    offers: O,
    restaurants: R,
}

/// Order service wired to SQLite repositories over one connection.
pub type SqliteOrderService<'conn> = OrderService<
    SqliteOrderRepository<'conn>,
    SqliteMenuRepository<'conn>,
    SqliteOfferRepository<'conn>,
    SqliteRestaurantRepository<'conn>,
>;

impl<'conn> SqliteOrderService<'conn> {
    pub fn from_connection(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteOrderRepository::try_new(conn)?,
            SqliteMenuRepository::try_new(conn)?,
            SqliteOfferRepository::try_new(conn)?,
            SqliteRestaurantRepository::try_new(conn)?,
        ))
    }
}

impl<Q, M, O, R> OrderService<Q, M, O, R>
where
    Q: OrderRepository,
    M: MenuRepository,
    O: OfferRepository,
    R: RestaurantRepository,
{
    pub fn new(orders: Q, menus: M, offers: O, restaurants: R) -> Self {
        Self {
            orders,
            menus,
            offers,
            restaurants,
        }
    }

    /// Prices `cart` against the restaurant's current menu and offers.
    ///
    /// An empty cart quotes as all zeros.
    pub fn quote(
        &self,
        restaurant_id: RestaurantId,
        cart: &Cart,
        policy: &PricingPolicy,
    ) -> Result<CartTotals, OrderServiceError> {
        self.load_restaurant(restaurant_id)?;
        if cart.is_empty() {
            return Ok(CartTotals::default());
        }
        let menu = self.load_menu(restaurant_id)?;
        let items = resolve_items(&menu, cart)?;
        let book = build_price_book(&self.offers, &items)?;
        Ok(price_cart(cart, &book, policy)?)
    }

    /// Places a `CREATED` order for `cart` and returns it.
    pub fn place_order(
        &self,
        restaurant_id: RestaurantId,
        cart: &Cart,
        policy: &PricingPolicy,
        note: Option<String>,
    ) -> Result<Order, OrderServiceError> {
        let restaurant = self.load_restaurant(restaurant_id)?;
        if !restaurant.is_open {
            return Err(OrderServiceError::RestaurantClosed(restaurant_id));
        }
        if cart.is_empty() {
            return Err(OrderServiceError::EmptyCart);
        }

        let menu = self.load_menu(restaurant_id)?;
        let items = resolve_items(&menu, cart)?;
        let book = build_price_book(&self.offers, &items)?;
        let totals = price_cart(cart, &book, policy)?;

        let lines = items
            .iter()
            .map(|item| {
                let unit = book.get(&item.id).copied().unwrap_or_default();
                OrderLine {
                    item_id: item.id,
                    name: item.name.clone(),
                    unit_price: unit.list,
                    unit_discount: unit.discount,
                    quantity: cart.quantity(item.id),
                }
            })
            .collect();

        let order = Order::new(restaurant_id, lines, totals, note);
        self.orders.create_order(&order)?;
        info!(
            "event=order_place module=service status=ok order_id={} lines={} total_cents={}",
            order.id,
            order.lines.len(),
            order.totals.total.cents()
        );
        Ok(order)
    }

    pub fn get_order(&self, order_id: OrderId) -> Result<Order, OrderServiceError> {
        self.orders
            .get_order(order_id)?
            .ok_or(OrderServiceError::OrderNotFound(order_id))
    }

    /// Progress step of the order's current status.
    pub fn status_step(&self, order_id: OrderId) -> Result<StatusStep, OrderServiceError> {
        Ok(step_of(self.get_order(order_id)?.status))
    }

    /// Kitchen view: newest orders first, filtered by restaurant and status.
    pub fn list_by_status(&self, query: &OrderListQuery) -> Result<Vec<Order>, OrderServiceError> {
        Ok(self.orders.list_orders(query)?)
    }

    /// Moves an order to `next` when the lifecycle allows it.
    pub fn update_status(
        &self,
        order_id: OrderId,
        next: OrderStatus,
    ) -> Result<Order, OrderServiceError> {
        let current = self.get_order(order_id)?.status;
        if !can_transition(current, next) {
            warn!(
                "event=order_status_update module=service status=rejected order_id={order_id} from={current} to={next}"
            );
            return Err(OrderServiceError::InvalidTransition {
                from: current,
                to: next,
            });
        }

        match self.orders.update_status(order_id, current, next) {
            Ok(()) => {}
            Err(RepoError::StaleStatus { actual, .. }) => {
                warn!(
                    "event=order_status_update module=service status=stale order_id={order_id} actual={actual}"
                );
                return Err(OrderServiceError::InvalidTransition {
                    from: actual,
                    to: next,
                });
            }
            Err(err) => return Err(err.into()),
        }

        info!(
            "event=order_status_update module=service status=ok order_id={order_id} from={current} to={next}"
        );
        self.get_order(order_id)
    }

    pub fn cancel(&self, order_id: OrderId) -> Result<Order, OrderServiceError> {
        self.update_status(order_id, OrderStatus::Cancelled)
    }

    fn load_restaurant(&self, id: RestaurantId) -> Result<Restaurant, OrderServiceError> {
        self.restaurants
            .get_restaurant(id)?
            .ok_or(OrderServiceError::RestaurantNotFound(id))
    }

    fn load_menu(&self, restaurant_id: RestaurantId) -> Result<Menu, OrderServiceError> {
        self.menus
            .get_menu_for_restaurant(restaurant_id)?
            .ok_or(OrderServiceError::MenuNotFound(restaurant_id))
    }
}

/// Cart items looked up on `menu`, in cart order.
fn resolve_items(menu: &Menu, cart: &Cart) -> Result<Vec<MenuItem>, OrderServiceError> {
    cart.iter()
        .map(|(item_id, _)| {
            let item = menu
                .find_item(item_id)
                .ok_or(OrderServiceError::UnknownItem(item_id))?;
            if !item.is_available {
                return Err(OrderServiceError::ItemUnavailable(item_id));
            }
            Ok(item.clone())
        })
        .collect()
}
