//! Order record and status labels.
//!
//! # Invariants
//! - An order carries at least one line and every line has `quantity >= 1`.
//! - `totals` are computed once at placement and never recomputed.
//! - Status transitions are validated by `tracking::status`, not here.

use crate::model::menu::ItemId;
use crate::model::money::{CartTotals, Money};
use crate::model::now_epoch_ms;
use crate::model::restaurant::RestaurantId;
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

pub type OrderId = Uuid;

/// Backend-driven lifecycle label of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    PaymentPending,
    Paid,
    Accepted,
    Completed,
    /// Alternate terminal state, reachable from any non-terminal state.
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Created,
        OrderStatus::PaymentPending,
        OrderStatus::Paid,
        OrderStatus::Accepted,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Wire label, e.g. `PAYMENT_PENDING`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::PaymentPending => "PAYMENT_PENDING",
            Self::Paid => "PAID",
            Self::Accepted => "ACCEPTED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status label that matches none of the known lifecycle states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl Display for UnknownStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown order status `{}`", self.0)
    }
}

impl Error for UnknownStatus {}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

/// One priced line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub item_id: ItemId,
    /// Item name captured at placement time.
    pub name: String,
    pub unit_price: Money,
    pub unit_discount: Money,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub restaurant_id: RestaurantId,
    pub lines: Vec<OrderLine>,
    pub totals: CartTotals,
    pub status: OrderStatus,
    pub note: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds; bumped on every status change.
    pub updated_at: i64,
}

impl Order {
    /// Creates a new order in `CREATED` state.
    pub fn new(
        restaurant_id: RestaurantId,
        lines: Vec<OrderLine>,
        totals: CartTotals,
        note: Option<String>,
    ) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            restaurant_id,
            lines,
            totals,
            status: OrderStatus::Created,
            note: note
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.lines.is_empty() {
            return Err(ValidationError::EmptyOrder);
        }
        if let Some(line) = self.lines.iter().find(|line| line.quantity == 0) {
            return Err(ValidationError::ZeroQuantity(line.item_id));
        }
        Ok(())
    }
}
