//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose restaurant, menu, cart, checkout and kitchen use-cases to Dart.
//! - Translate core types into flat, FRB-friendly records (string ids, cents).
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Failures are reported as `ok = false` plus a message; callers keep their
//!   previous state and show the message.
//! - Cart functions are pure: the cart lives in the UI and is passed in and
//!   returned whole.

use dineflow_core::db::open_db;
use dineflow_core::{
    core_version as core_version_inner, init_logging as init_logging_inner,
    normalize_poll_interval, ping as ping_inner, status_step as status_step_inner, step_of,
    Cart, CartLine, CartTotals, Menu, MenuFilter, MenuItem, Money, NewMenuItem, Order,
    OrderListQuery, OrderStatus, PriceSort, PricingPolicy, Restaurant, SqliteMenuService,
    SqliteOrderService, SqliteRestaurantService, StatusStep, ORDER_STEPS,
};
use log::warn;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use uuid::Uuid;

const DB_FILE_NAME: &str = "dineflow.sqlite3";
const DB_PATH_ENV: &str = "DINEFLOW_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static DB_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Generic action envelope carrying the id of the touched record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    pub id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfiRestaurant {
    pub restaurant_id: String,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub is_open: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantResponse {
    pub ok: bool,
    pub restaurant: Option<FfiRestaurant>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfiMenuItem {
    pub item_id: String,
    pub category_id: String,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub tags: Vec<String>,
    pub image_base64: Option<String>,
    pub is_available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfiMenuCategory {
    pub category_id: String,
    pub name: String,
    pub items: Vec<FfiMenuItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfiMenu {
    pub menu_id: String,
    pub restaurant_id: String,
    pub version: u32,
    pub categories: Vec<FfiMenuCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuResponse {
    pub ok: bool,
    pub menu: Option<FfiMenu>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItemsResponse {
    pub ok: bool,
    pub items: Vec<FfiMenuItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfiCartLine {
    pub item_id: String,
    pub quantity: u32,
}

/// Cart envelope. On failure `lines` is the unchanged input cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartResponse {
    pub ok: bool,
    pub lines: Vec<FfiCartLine>,
    pub total_items: u32,
    pub message: String,
}

/// Priced cart, all amounts in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FfiTotals {
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub delivery_fee_cents: i64,
    pub total_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteResponse {
    pub ok: bool,
    pub totals: Option<FfiTotals>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfiOrderLine {
    pub item_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub unit_discount_cents: i64,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfiOrder {
    pub order_id: String,
    pub restaurant_id: String,
    /// Wire label such as `PAID`.
    pub status: String,
    pub step_index: i32,
    pub lines: Vec<FfiOrderLine>,
    pub totals: FfiTotals,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderResponse {
    pub ok: bool,
    pub order: Option<FfiOrder>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderListResponse {
    pub ok: bool,
    pub orders: Vec<FfiOrder>,
    pub message: String,
}

/// Progress step for the status modal.
///
/// `step_index` is `-1` for cancelled orders and for failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusStepResponse {
    pub ok: bool,
    pub status: Option<String>,
    pub step_index: i32,
    /// Number of non-cancelled steps in the progress display.
    pub step_count: u32,
    pub message: String,
}

/// Creates an open restaurant.
#[flutter_rust_bridge::frb(sync)]
pub fn restaurant_create(name: String, address: String, phone: Option<String>) -> ActionResponse {
    let result = with_connection(|conn| {
        let service = SqliteRestaurantService::from_connection(conn).map_err(err_text)?;
        service
            .create_restaurant(name, address, phone)
            .map_err(err_text)
    });
    match result {
        Ok(restaurant) => ActionResponse::success("Restaurant created.", restaurant.id),
        Err(err) => ActionResponse::failure("restaurant_create", err),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn restaurant_get(restaurant_id: String) -> RestaurantResponse {
    let result = parse_id(&restaurant_id, "restaurant_id").and_then(|id| {
        with_connection(|conn| {
            let service = SqliteRestaurantService::from_connection(conn).map_err(err_text)?;
            service
                .get_restaurant(id)
                .map_err(err_text)?
                .ok_or_else(|| format!("restaurant not found: {id}"))
        })
    });
    match result {
        Ok(restaurant) => RestaurantResponse {
            ok: true,
            restaurant: Some(to_ffi_restaurant(restaurant)),
            message: String::new(),
        },
        Err(err) => RestaurantResponse {
            ok: false,
            restaurant: None,
            message: failure_message("restaurant_get", err),
        },
    }
}

/// Creates the restaurant's menu or re-versions the existing one.
#[flutter_rust_bridge::frb(sync)]
pub fn menu_create(restaurant_id: String, version: u32) -> ActionResponse {
    let result = parse_id(&restaurant_id, "restaurant_id").and_then(|id| {
        with_connection(|conn| {
            let service = SqliteMenuService::from_connection(conn).map_err(err_text)?;
            service.create_menu(id, version).map_err(err_text)
        })
    });
    match result {
        Ok(menu) => ActionResponse::success("Menu saved.", menu.id),
        Err(err) => ActionResponse::failure("menu_create", err),
    }
}

/// Full menu of a restaurant, categories in display order.
#[flutter_rust_bridge::frb(sync)]
pub fn menu_fetch(restaurant_id: String) -> MenuResponse {
    let result = parse_id(&restaurant_id, "restaurant_id").and_then(|id| {
        with_connection(|conn| {
            let service = SqliteMenuService::from_connection(conn).map_err(err_text)?;
            service.get_menu_for_restaurant(id).map_err(err_text)
        })
    });
    match result {
        Ok(menu) => MenuResponse {
            ok: true,
            menu: Some(to_ffi_menu(menu)),
            message: String::new(),
        },
        Err(err) => MenuResponse {
            ok: false,
            menu: None,
            message: failure_message("menu_fetch", err),
        },
    }
}

/// Adds an item; `category` is a name and is created when missing.
#[flutter_rust_bridge::frb(sync)]
pub fn menu_add_item(
    menu_id: String,
    name: String,
    description: String,
    price_cents: i64,
    category: String,
    tags: Vec<String>,
    image_base64: Option<String>,
) -> ActionResponse {
    let draft = NewMenuItem {
        name,
        description,
        price: Money::from_cents(price_cents),
        category,
        tags,
        image_base64,
    };
    let result = parse_id(&menu_id, "menu_id").and_then(|id| {
        with_connection(|conn| {
            let service = SqliteMenuService::from_connection(conn).map_err(err_text)?;
            service.add_item(id, draft).map_err(err_text)
        })
    });
    match result {
        Ok(item) => ActionResponse::success("Item added.", item.id),
        Err(err) => ActionResponse::failure("menu_add_item", err),
    }
}

/// Filtered item list for the browse screen.
///
/// `sort` accepts `asc`, `desc` or an empty string for menu order.
#[flutter_rust_bridge::frb(sync)]
pub fn menu_browse(
    restaurant_id: String,
    category_id: Option<String>,
    search: Option<String>,
    tag: Option<String>,
    available_only: bool,
    sort: String,
) -> MenuItemsResponse {
    let result = (|| {
        let restaurant_id = parse_id(&restaurant_id, "restaurant_id")?;
        let filter = MenuFilter {
            category: category_id
                .as_deref()
                .map(|raw| parse_id(raw, "category_id"))
                .transpose()?,
            search,
            tag,
            available_only,
            sort: parse_sort(&sort)?,
        };
        with_connection(|conn| {
            let service = SqliteMenuService::from_connection(conn).map_err(err_text)?;
            service.browse(restaurant_id, &filter).map_err(err_text)
        })
    })();
    match result {
        Ok(items) => MenuItemsResponse {
            ok: true,
            message: format!("{} item(s).", items.len()),
            items: items.into_iter().map(to_ffi_item).collect(),
        },
        Err(err) => MenuItemsResponse {
            ok: false,
            items: Vec::new(),
            message: failure_message("menu_browse", err),
        },
    }
}

/// Adds one unit of `item_id` to the cart.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_add(lines: Vec<FfiCartLine>, item_id: String) -> CartResponse {
    mutate_cart("cart_add", lines, |cart| {
        let id = parse_id(&item_id, "item_id")?;
        cart.add(id).map(|_| ()).map_err(err_text)
    })
}

/// Removes one unit of `item_id`; the line disappears below one.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_remove(lines: Vec<FfiCartLine>, item_id: String) -> CartResponse {
    mutate_cart("cart_remove", lines, |cart| {
        let id = parse_id(&item_id, "item_id")?;
        cart.remove(id);
        Ok(())
    })
}

/// Sets the quantity of `item_id`; zero removes the line.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_set_quantity(lines: Vec<FfiCartLine>, item_id: String, quantity: u32) -> CartResponse {
    mutate_cart("cart_set_quantity", lines, |cart| {
        let id = parse_id(&item_id, "item_id")?;
        cart.set_quantity(id, quantity).map_err(err_text)
    })
}

/// Prices the cart against the restaurant's live menu and offers.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_quote(restaurant_id: String, lines: Vec<FfiCartLine>) -> QuoteResponse {
    let result = (|| {
        let restaurant_id = parse_id(&restaurant_id, "restaurant_id")?;
        let cart = to_cart(&lines)?;
        with_connection(|conn| {
            let service = SqliteOrderService::from_connection(conn).map_err(err_text)?;
            service
                .quote(restaurant_id, &cart, &PricingPolicy::default())
                .map_err(err_text)
        })
    })();
    match result {
        Ok(totals) => QuoteResponse {
            ok: true,
            totals: Some(to_ffi_totals(totals)),
            message: String::new(),
        },
        Err(err) => QuoteResponse {
            ok: false,
            totals: None,
            message: failure_message("cart_quote", err),
        },
    }
}

/// Places an order for the cart. The caller clears its cart on `ok`.
#[flutter_rust_bridge::frb(sync)]
pub fn order_place(
    restaurant_id: String,
    lines: Vec<FfiCartLine>,
    note: Option<String>,
) -> OrderResponse {
    let result = (|| {
        let restaurant_id = parse_id(&restaurant_id, "restaurant_id")?;
        let cart = to_cart(&lines)?;
        with_connection(|conn| {
            let service = SqliteOrderService::from_connection(conn).map_err(err_text)?;
            service
                .place_order(restaurant_id, &cart, &PricingPolicy::default(), note)
                .map_err(err_text)
        })
    })();
    order_response("order_place", "Order placed.", result)
}

/// Current progress step of a stored order.
#[flutter_rust_bridge::frb(sync)]
pub fn order_status_step(order_id: String) -> StatusStepResponse {
    let result = parse_id(&order_id, "order_id").and_then(|id| {
        with_connection(|conn| {
            let service = SqliteOrderService::from_connection(conn).map_err(err_text)?;
            service.get_order(id).map_err(err_text)
        })
    });
    match result {
        Ok(order) => step_response(order.status.as_str(), step_of(order.status)),
        Err(err) => step_failure("order_status_step", err),
    }
}

/// Step for a raw status label as received from a poll.
#[flutter_rust_bridge::frb(sync)]
pub fn status_step_index(status: String) -> StatusStepResponse {
    match status_step_inner(&status) {
        Ok(step) => step_response(status.trim(), step),
        Err(err) => step_failure("status_step_index", err.to_string()),
    }
}

/// Kitchen list, newest first. `status` filters by wire label when set.
#[flutter_rust_bridge::frb(sync)]
pub fn kitchen_list(
    restaurant_id: String,
    status: Option<String>,
    limit: Option<u32>,
) -> OrderListResponse {
    let result = (|| {
        let query = OrderListQuery {
            restaurant_id: Some(parse_id(&restaurant_id, "restaurant_id")?),
            status: status
                .as_deref()
                .map(|raw| raw.parse::<OrderStatus>().map_err(err_text))
                .transpose()?,
            limit,
            offset: 0,
        };
        with_connection(|conn| {
            let service = SqliteOrderService::from_connection(conn).map_err(err_text)?;
            service.list_by_status(&query).map_err(err_text)
        })
    })();
    match result {
        Ok(orders) => OrderListResponse {
            ok: true,
            message: format!("{} order(s).", orders.len()),
            orders: orders.into_iter().map(to_ffi_order).collect(),
        },
        Err(err) => OrderListResponse {
            ok: false,
            orders: Vec::new(),
            message: failure_message("kitchen_list", err),
        },
    }
}

/// Moves an order forward in its lifecycle.
#[flutter_rust_bridge::frb(sync)]
pub fn kitchen_update_status(order_id: String, status: String) -> OrderResponse {
    let result = (|| {
        let order_id = parse_id(&order_id, "order_id")?;
        let next = status.parse::<OrderStatus>().map_err(err_text)?;
        with_connection(|conn| {
            let service = SqliteOrderService::from_connection(conn).map_err(err_text)?;
            service.update_status(order_id, next).map_err(err_text)
        })
    })();
    order_response("kitchen_update_status", "Status updated.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn order_cancel(order_id: String) -> OrderResponse {
    let result = parse_id(&order_id, "order_id").and_then(|id| {
        with_connection(|conn| {
            let service = SqliteOrderService::from_connection(conn).map_err(err_text)?;
            service.cancel(id).map_err(err_text)
        })
    });
    order_response("order_cancel", "Order cancelled.", result)
}

/// Poll interval the status modal should use, clamped to 5..=30 seconds.
#[flutter_rust_bridge::frb(sync)]
pub fn poll_interval_secs(requested: Option<u64>) -> u64 {
    normalize_poll_interval(requested).as_secs()
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Uuid) -> Self {
        Self {
            ok: true,
            id: Some(id.to_string()),
            message: message.into(),
        }
    }

    fn failure(operation: &str, err: String) -> Self {
        Self {
            ok: false,
            id: None,
            message: failure_message(operation, err),
        }
    }
}

fn failure_message(operation: &str, err: String) -> String {
    warn!("event=ffi_call module=ffi status=error op={operation}");
    format!("{operation} failed: {err}")
}

fn err_text(err: impl std::fmt::Display) -> String {
    err.to_string()
}

fn parse_id(raw: &str, field: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid {field}: `{raw}`"))
}

fn parse_sort(raw: &str) -> Result<PriceSort, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "none" => Ok(PriceSort::Unsorted),
        "asc" | "ascending" => Ok(PriceSort::Ascending),
        "desc" | "descending" => Ok(PriceSort::Descending),
        other => Err(format!("unsupported sort `{other}`; expected asc|desc")),
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

/// Opens the app database and runs `f` while holding the process-wide DB lock.
fn with_connection<T>(f: impl FnOnce(&Connection) -> Result<T, String>) -> Result<T, String> {
    let _guard = DB_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let conn = open_db(resolve_db_path()).map_err(|err| format!("DB open failed: {err}"))?;
    f(&conn)
}

fn mutate_cart(
    operation: &str,
    lines: Vec<FfiCartLine>,
    change: impl FnOnce(&mut Cart) -> Result<(), String>,
) -> CartResponse {
    let result = to_cart(&lines).and_then(|mut cart| {
        change(&mut cart)?;
        Ok(cart)
    });
    match result {
        Ok(cart) => CartResponse {
            ok: true,
            total_items: cart.total_items(),
            lines: cart.lines().into_iter().map(to_ffi_cart_line).collect(),
            message: String::new(),
        },
        Err(err) => CartResponse {
            ok: false,
            // Rejected input may carry arbitrary quantities.
            total_items: lines
                .iter()
                .fold(0u32, |acc, line| acc.saturating_add(line.quantity)),
            lines,
            message: failure_message(operation, err),
        },
    }
}

fn to_cart(lines: &[FfiCartLine]) -> Result<Cart, String> {
    let parsed = lines
        .iter()
        .map(|line| {
            Ok(CartLine {
                item_id: parse_id(&line.item_id, "item_id")?,
                quantity: line.quantity,
            })
        })
        .collect::<Result<Vec<_>, String>>()?;
    Cart::from_lines(&parsed).map_err(err_text)
}

fn to_ffi_cart_line(line: CartLine) -> FfiCartLine {
    FfiCartLine {
        item_id: line.item_id.to_string(),
        quantity: line.quantity,
    }
}

fn order_response(operation: &str, message: &str, result: Result<Order, String>) -> OrderResponse {
    match result {
        Ok(order) => OrderResponse {
            ok: true,
            order: Some(to_ffi_order(order)),
            message: message.to_string(),
        },
        Err(err) => OrderResponse {
            ok: false,
            order: None,
            message: failure_message(operation, err),
        },
    }
}

fn step_response(status: &str, step: StatusStep) -> StatusStepResponse {
    StatusStepResponse {
        ok: true,
        status: Some(status.to_ascii_uppercase()),
        step_index: step.as_index(),
        step_count: ORDER_STEPS.len() as u32,
        message: String::new(),
    }
}

fn step_failure(operation: &str, err: String) -> StatusStepResponse {
    StatusStepResponse {
        ok: false,
        status: None,
        step_index: StatusStep::Cancelled.as_index(),
        step_count: ORDER_STEPS.len() as u32,
        message: failure_message(operation, err),
    }
}

fn to_ffi_restaurant(restaurant: Restaurant) -> FfiRestaurant {
    FfiRestaurant {
        restaurant_id: restaurant.id.to_string(),
        name: restaurant.name,
        address: restaurant.address,
        phone: restaurant.phone,
        is_open: restaurant.is_open,
    }
}

fn to_ffi_menu(menu: Menu) -> FfiMenu {
    FfiMenu {
        menu_id: menu.id.to_string(),
        restaurant_id: menu.restaurant_id.to_string(),
        version: menu.version,
        categories: menu
            .categories
            .into_iter()
            .map(|category| FfiMenuCategory {
                category_id: category.id.to_string(),
                name: category.name,
                items: category.items.into_iter().map(to_ffi_item).collect(),
            })
            .collect(),
    }
}

fn to_ffi_item(item: MenuItem) -> FfiMenuItem {
    FfiMenuItem {
        item_id: item.id.to_string(),
        category_id: item.category_id.to_string(),
        name: item.name,
        description: item.description,
        price_cents: item.price.cents(),
        tags: item.tags,
        image_base64: item.image_base64,
        is_available: item.is_available,
    }
}

fn to_ffi_totals(totals: CartTotals) -> FfiTotals {
    FfiTotals {
        subtotal_cents: totals.subtotal.cents(),
        discount_cents: totals.discount.cents(),
        tax_cents: totals.tax.cents(),
        delivery_fee_cents: totals.delivery_fee.cents(),
        total_cents: totals.total.cents(),
    }
}

fn to_ffi_order(order: Order) -> FfiOrder {
    FfiOrder {
        order_id: order.id.to_string(),
        restaurant_id: order.restaurant_id.to_string(),
        status: order.status.as_str().to_string(),
        step_index: step_of(order.status).as_index(),
        lines: order
            .lines
            .into_iter()
            .map(|line| FfiOrderLine {
                item_id: line.item_id.to_string(),
                name: line.name,
                unit_price_cents: line.unit_price.cents(),
                unit_discount_cents: line.unit_discount.cents(),
                quantity: line.quantity,
            })
            .collect(),
        totals: to_ffi_totals(order.totals),
        note: order.note,
        created_at: order.created_at,
        updated_at: order.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        cart_add, cart_quote, cart_remove, cart_set_quantity, core_version, init_logging,
        kitchen_list, kitchen_update_status, menu_add_item, menu_browse, menu_create, menu_fetch,
        order_cancel, order_place, order_status_step, ping, poll_interval_secs, restaurant_create,
        resolve_db_path, restaurant_get, status_step_index, FfiCartLine, DB_PATH,
    };
    use std::sync::OnceLock;
    use tempfile::TempDir;

    /// Points every DB-backed test in this binary at one throwaway file.
    fn scratch_db() -> &'static TempDir {
        static DIR: OnceLock<TempDir> = OnceLock::new();
        let dir = DIR.get_or_init(|| tempfile::tempdir().expect("temp dir"));
        let _ = DB_PATH.set(dir.path().join("dineflow_ffi_test.sqlite3"));
        dir
    }

    fn seed_restaurant() -> (String, String, String) {
        scratch_db();
        let restaurant = restaurant_create("Luigi's".to_string(), "1 Main St".to_string(), None);
        assert!(restaurant.ok, "{}", restaurant.message);
        let restaurant_id = restaurant.id.expect("restaurant id");

        let menu = menu_create(restaurant_id.clone(), 1);
        assert!(menu.ok, "{}", menu.message);
        let menu_id = menu.id.expect("menu id");

        let item = menu_add_item(
            menu_id.clone(),
            "Margherita".to_string(),
            "Tomato and basil".to_string(),
            1000,
            "Pizza".to_string(),
            vec!["Veg".to_string()],
            None,
        );
        assert!(item.ok, "{}", item.message);
        (restaurant_id, menu_id, item.id.expect("item id"))
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn poll_interval_is_clamped() {
        assert_eq!(poll_interval_secs(None), 10);
        assert_eq!(poll_interval_secs(Some(1)), 5);
        assert_eq!(poll_interval_secs(Some(600)), 30);
    }

    #[test]
    fn status_step_index_maps_labels_and_sentinel() {
        let paid = status_step_index("paid".to_string());
        assert!(paid.ok);
        assert_eq!(paid.step_index, 2);
        assert_eq!(paid.status.as_deref(), Some("PAID"));
        assert_eq!(paid.step_count, 5);

        assert_eq!(status_step_index("CANCELLED".to_string()).step_index, -1);

        let unknown = status_step_index("SHIPPED".to_string());
        assert!(!unknown.ok);
        assert!(unknown.message.contains("SHIPPED"));
    }

    #[test]
    fn cart_functions_are_pure_and_keep_state_on_failure() {
        let item = "6f1c1d8e-9b1e-4c55-8f2a-2d4d3b0c9a11".to_string();
        let added = cart_add(Vec::new(), item.clone());
        let added = cart_add(added.lines, item.clone());
        assert!(added.ok);
        assert_eq!(added.total_items, 2);

        let over = cart_set_quantity(added.lines.clone(), item.clone(), 500);
        assert!(!over.ok);
        assert_eq!(over.lines, added.lines);

        let removed = cart_remove(added.lines, item.clone());
        let removed = cart_remove(removed.lines, item);
        assert!(removed.ok);
        assert!(removed.lines.is_empty());

        let bad = cart_add(Vec::new(), "not-a-uuid".to_string());
        assert!(!bad.ok);
        assert!(bad.message.contains("item_id"));
    }

    #[test]
    fn rejected_cart_with_huge_quantities_reports_saturated_total() {
        let first = "6f1c1d8e-9b1e-4c55-8f2a-2d4d3b0c9a11".to_string();
        let second = "0b7e3a52-41c9-4f0e-9d1a-5c2b8e6f7a30".to_string();
        let lines = vec![
            FfiCartLine {
                item_id: first.clone(),
                quantity: u32::MAX,
            },
            FfiCartLine {
                item_id: second,
                quantity: 1,
            },
        ];

        let response = cart_add(lines.clone(), first);
        assert!(!response.ok);
        assert_eq!(response.lines, lines);
        assert_eq!(response.total_items, u32::MAX);
    }

    #[test]
    fn tests_use_their_own_database_file() {
        let dir = scratch_db();
        assert!(resolve_db_path().starts_with(dir.path()));
    }

    #[test]
    fn restaurant_and_menu_roundtrip() {
        let (restaurant_id, menu_id, item_id) = seed_restaurant();

        let restaurant = restaurant_get(restaurant_id.clone());
        assert!(restaurant.ok, "{}", restaurant.message);
        assert_eq!(restaurant.restaurant.expect("restaurant").name, "Luigi's");

        let menu = menu_fetch(restaurant_id.clone()).menu.expect("menu");
        assert_eq!(menu.menu_id, menu_id);
        assert_eq!(menu.categories[0].name, "Pizza");
        assert_eq!(menu.categories[0].items[0].item_id, item_id);
        assert_eq!(menu.categories[0].items[0].tags, vec!["veg".to_string()]);

        let browsed = menu_browse(
            restaurant_id,
            None,
            Some("basil".to_string()),
            None,
            true,
            "asc".to_string(),
        );
        assert!(browsed.ok, "{}", browsed.message);
        assert_eq!(browsed.items.len(), 1);
    }

    #[test]
    fn menu_browse_rejects_unknown_sort() {
        let (restaurant_id, _, _) = seed_restaurant();
        let response = menu_browse(restaurant_id, None, None, None, false, "sideways".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("sideways"));
    }

    #[test]
    fn checkout_and_kitchen_flow() {
        let (restaurant_id, _, item_id) = seed_restaurant();
        let lines = vec![FfiCartLine {
            item_id: item_id.clone(),
            quantity: 2,
        }];

        let quote = cart_quote(restaurant_id.clone(), lines.clone());
        assert!(quote.ok, "{}", quote.message);
        let totals = quote.totals.expect("totals");
        assert_eq!(totals.subtotal_cents, 2000);
        assert_eq!(totals.tax_cents, 165);
        assert_eq!(totals.total_cents, 2000 + 165 + 299);

        let placed = order_place(restaurant_id.clone(), lines, None);
        assert!(placed.ok, "{}", placed.message);
        let order = placed.order.expect("order");
        assert_eq!(order.status, "CREATED");
        assert_eq!(order.step_index, 0);

        let listed = kitchen_list(restaurant_id.clone(), Some("created".to_string()), None);
        assert!(listed.ok, "{}", listed.message);
        assert!(listed.orders.iter().any(|o| o.order_id == order.order_id));

        let paid = kitchen_update_status(order.order_id.clone(), "PAID".to_string());
        assert!(paid.ok, "{}", paid.message);
        assert_eq!(order_status_step(order.order_id.clone()).step_index, 2);

        let backwards = kitchen_update_status(order.order_id.clone(), "CREATED".to_string());
        assert!(!backwards.ok);

        let cancelled = order_cancel(order.order_id.clone());
        assert!(cancelled.ok, "{}", cancelled.message);
        assert_eq!(order_status_step(order.order_id).step_index, -1);
    }

    #[test]
    fn order_place_rejects_empty_cart() {
        let (restaurant_id, _, _) = seed_restaurant();
        let response = order_place(restaurant_id, Vec::new(), None);
        assert!(!response.ok);
        assert!(response.message.contains("empty"));
    }
}
