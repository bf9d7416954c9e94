//! Order repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist orders with their lines atomically.
//! - Serve kitchen list queries by restaurant and status.
//! - Apply status changes as compare-and-set writes.
//!
//! # Invariants
//! - An order row is never visible without its lines.
//! - `update_status` only writes when the stored status equals `expected`.
//! - Lists are sorted by `created_at DESC`, later inserts first on ties.

use crate::model::money::{CartTotals, Money};
use crate::model::order::{Order, OrderId, OrderLine, OrderStatus};
use crate::model::restaurant::RestaurantId;
use crate::model::now_epoch_ms;
use crate::repo::shared::{
    check_row, ensure_tables, normalize_limit, parse_u32, parse_uuid, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

pub const ORDERS_DEFAULT_LIMIT: u32 = 20;
pub const ORDERS_LIMIT_MAX: u32 = 100;

const ORDER_SELECT_SQL: &str = "SELECT
    id,
    restaurant_id,
    status,
    subtotal,
    discount,
    tax,
    delivery_fee,
    total,
    note,
    created_at,
    updated_at
FROM orders";

/// Query options for order lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderListQuery {
    pub restaurant_id: Option<RestaurantId>,
    pub status: Option<OrderStatus>,
    /// Defaults to 20 and clamps to 100.
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for orders.
pub trait OrderRepository {
    fn create_order(&self, order: &Order) -> RepoResult<OrderId>;
    fn get_order(&self, id: OrderId) -> RepoResult<Option<Order>>;
    fn list_orders(&self, query: &OrderListQuery) -> RepoResult<Vec<Order>>;
    /// Moves `id` from `expected` to `next`.
    ///
    /// Fails with `NotFound` when the order is missing and `StaleStatus` when
    /// the stored status is no longer `expected`.
    fn update_status(&self, id: OrderId, expected: OrderStatus, next: OrderStatus)
        -> RepoResult<()>;
}

/// SQLite-backed order repository.
pub struct SqliteOrderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOrderRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["orders", "order_lines"])?;
        Ok(Self { conn })
    }

    fn load_lines(&self, order_id: &str) -> RepoResult<Vec<OrderLine>> {
        let mut stmt = self.conn.prepare(
            "SELECT item_id, name, unit_price, unit_discount, quantity
             FROM order_lines
             WHERE order_id = ?1
             ORDER BY line_no ASC;",
        )?;
        let mut rows = stmt.query([order_id])?;
        let mut lines = Vec::new();
        while let Some(row) = rows.next()? {
            let item_id_text: String = row.get("item_id")?;
            lines.push(OrderLine {
                item_id: parse_uuid(&item_id_text, "order_lines.item_id")?,
                name: row.get("name")?,
                unit_price: Money::from_cents(row.get("unit_price")?),
                unit_discount: Money::from_cents(row.get("unit_discount")?),
                quantity: parse_u32(row.get("quantity")?, "order_lines.quantity")?,
            });
        }
        Ok(lines)
    }

    fn parse_order_row(&self, row: &Row<'_>) -> RepoResult<Order> {
        let id_text: String = row.get("id")?;
        let restaurant_id_text: String = row.get("restaurant_id")?;
        let order = Order {
            id: parse_uuid(&id_text, "orders.id")?,
            restaurant_id: parse_uuid(&restaurant_id_text, "orders.restaurant_id")?,
            lines: self.load_lines(&id_text)?,
            totals: CartTotals {
                subtotal: Money::from_cents(row.get("subtotal")?),
                discount: Money::from_cents(row.get("discount")?),
                tax: Money::from_cents(row.get("tax")?),
                delivery_fee: Money::from_cents(row.get("delivery_fee")?),
                total: Money::from_cents(row.get("total")?),
            },
            status: parse_status(&row.get::<_, String>("status")?)?,
            note: row.get("note")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        };
        check_row(order.validate(), "orders")?;
        Ok(order)
    }

    fn current_status(&self, id: OrderId) -> RepoResult<Option<OrderStatus>> {
        let status: Option<String> = self
            .conn
            .query_row(
                "SELECT status FROM orders WHERE id = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        status.as_deref().map(parse_status).transpose()
    }
}

impl OrderRepository for SqliteOrderRepository<'_> {
    fn create_order(&self, order: &Order) -> RepoResult<OrderId> {
        order.validate()?;

        let order_id = order.id.to_string();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO orders (
                id,
                restaurant_id,
                status,
                subtotal,
                discount,
                tax,
                delivery_fee,
                total,
                note,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                order_id.as_str(),
                order.restaurant_id.to_string(),
                order.status.as_str(),
                order.totals.subtotal.cents(),
                order.totals.discount.cents(),
                order.totals.tax.cents(),
                order.totals.delivery_fee.cents(),
                order.totals.total.cents(),
                order.note.as_deref(),
                order.created_at,
                order.updated_at,
            ],
        )?;

        for (line_no, line) in order.lines.iter().enumerate() {
            tx.execute(
                "INSERT INTO order_lines (
                    order_id,
                    line_no,
                    item_id,
                    name,
                    unit_price,
                    unit_discount,
                    quantity
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    order_id.as_str(),
                    i64::try_from(line_no).unwrap_or(i64::MAX),
                    line.item_id.to_string(),
                    line.name.as_str(),
                    line.unit_price.cents(),
                    line.unit_discount.cents(),
                    i64::from(line.quantity),
                ],
            )?;
        }
        tx.commit()?;

        Ok(order.id)
    }

    fn get_order(&self, id: OrderId) -> RepoResult<Option<Order>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ORDER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(self.parse_order_row(row)?));
        }
        Ok(None)
    }

    fn list_orders(&self, query: &OrderListQuery) -> RepoResult<Vec<Order>> {
        let mut sql = format!("{ORDER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(restaurant_id) = query.restaurant_id {
            sql.push_str(" AND restaurant_id = ?");
            bind_values.push(Value::Text(restaurant_id.to_string()));
        }
        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        sql.push_str(" ORDER BY created_at DESC, rowid DESC LIMIT ?");
        let limit = normalize_limit(query.limit, ORDERS_DEFAULT_LIMIT, ORDERS_LIMIT_MAX);
        bind_values.push(Value::Integer(i64::from(limit)));
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut orders = Vec::new();
        while let Some(row) = rows.next()? {
            orders.push(self.parse_order_row(row)?);
        }
        Ok(orders)
    }

    fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE orders
             SET status = ?3, updated_at = ?4
             WHERE id = ?1 AND status = ?2;",
            params![
                id.to_string(),
                expected.as_str(),
                next.as_str(),
                now_epoch_ms(),
            ],
        )?;

        if changed == 1 {
            return Ok(());
        }

        match self.current_status(id)? {
            None => Err(RepoError::NotFound {
                entity: "order",
                id,
            }),
            Some(actual) => Err(RepoError::StaleStatus {
                id,
                expected,
                actual,
            }),
        }
    }
}

fn parse_status(value: &str) -> RepoResult<OrderStatus> {
    value.parse::<OrderStatus>().map_err(|_| {
        RepoError::InvalidData(format!("invalid order status `{value}` in orders.status"))
    })
}
