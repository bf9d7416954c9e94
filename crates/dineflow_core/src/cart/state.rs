//! Cart mutation.

use crate::model::menu::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upper bound for one line's quantity.
pub const MAX_LINE_QUANTITY: u32 = 99;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Requested quantity is above `MAX_LINE_QUANTITY`.
    QuantityLimit { item_id: ItemId, requested: u32 },
}

impl Display for CartError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuantityLimit { item_id, requested } => write!(
                f,
                "quantity {requested} for item {item_id} exceeds limit {MAX_LINE_QUANTITY}"
            ),
        }
    }
}

impl Error for CartError {}

/// One `(item, quantity)` pair of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub item_id: ItemId,
    pub quantity: u32,
}

/// Ephemeral mapping from item to quantity.
///
/// Ordered by item id so that iteration and pricing are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: BTreeMap<ItemId, u32>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a cart from lines, merging duplicates and dropping zeros.
    pub fn from_lines(lines: &[CartLine]) -> Result<Self, CartError> {
        let mut cart = Self::new();
        for line in lines {
            let merged = cart.quantity(line.item_id).saturating_add(line.quantity);
            cart.set_quantity(line.item_id, merged)?;
        }
        Ok(cart)
    }

    /// Increments the quantity of `item_id` by one.
    pub fn add(&mut self, item_id: ItemId) -> Result<u32, CartError> {
        let next = self.quantity(item_id) + 1;
        if next > MAX_LINE_QUANTITY {
            return Err(CartError::QuantityLimit {
                item_id,
                requested: next,
            });
        }
        self.lines.insert(item_id, next);
        Ok(next)
    }

    /// Decrements the quantity of `item_id`; the key is deleted below one.
    ///
    /// Returns the remaining quantity. Removing an absent item is a no-op.
    pub fn remove(&mut self, item_id: ItemId) -> u32 {
        match self.lines.get(&item_id).copied() {
            Some(quantity) if quantity > 1 => {
                self.lines.insert(item_id, quantity - 1);
                quantity - 1
            }
            Some(_) => {
                self.lines.remove(&item_id);
                0
            }
            None => 0,
        }
    }

    /// Sets an absolute quantity; `0` deletes the key.
    pub fn set_quantity(&mut self, item_id: ItemId, quantity: u32) -> Result<(), CartError> {
        if quantity > MAX_LINE_QUANTITY {
            return Err(CartError::QuantityLimit {
                item_id,
                requested: quantity,
            });
        }
        if quantity == 0 {
            self.lines.remove(&item_id);
        } else {
            self.lines.insert(item_id, quantity);
        }
        Ok(())
    }

    pub fn quantity(&self, item_id: ItemId) -> u32 {
        self.lines.get(&item_id).copied().unwrap_or(0)
    }

    /// Sum of all quantities.
    pub fn total_items(&self) -> u32 {
        self.lines.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> Vec<CartLine> {
        self.iter()
            .map(|(item_id, quantity)| CartLine { item_id, quantity })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, u32)> + '_ {
        self.lines.iter().map(|(item_id, quantity)| (*item_id, *quantity))
    }
}
