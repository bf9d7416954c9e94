//! Cart pricing.
//!
//! # Contract
//! - `subtotal = sum(list_price * quantity)`
//! - `discount = sum(unit_discount * quantity)`
//! - `tax = round_half_up((subtotal - discount) * tax_rate_bps / 10_000)`
//! - `delivery_fee` applies only to a non-empty cart
//! - `total = subtotal - discount + tax + delivery_fee`

use crate::cart::state::Cart;
use crate::model::menu::ItemId;
use crate::model::money::{CartTotals, Money};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_TAX_RATE_BPS: u32 = 825;
pub const DEFAULT_DELIVERY_FEE: Money = Money(299);

/// Tax and fee settings applied on top of item prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPolicy {
    /// Basis points, `825` = 8.25%.
    pub tax_rate_bps: u32,
    pub delivery_fee: Money,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate_bps: DEFAULT_TAX_RATE_BPS,
            delivery_fee: DEFAULT_DELIVERY_FEE,
        }
    }
}

/// Per-unit price of one item after offer resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitPrice {
    pub list: Money,
    /// Already capped at `list`.
    pub discount: Money,
}

impl UnitPrice {
    pub fn undiscounted(list: Money) -> Self {
        Self {
            list,
            discount: Money::ZERO,
        }
    }

    pub fn effective(self) -> Money {
        Money(self.list.cents() - self.discount.cents())
    }
}

/// Item id -> unit price lookup used by `price_cart`.
pub type PriceBook = HashMap<ItemId, UnitPrice>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Cart references an item the price book does not know.
    UnknownItem(ItemId),
    Overflow,
}

impl Display for PricingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownItem(item_id) => write!(f, "no price for item {item_id}"),
            Self::Overflow => write!(f, "cart total overflowed"),
        }
    }
}

impl Error for PricingError {}

/// Prices every cart line and folds in tax and delivery fee.
pub fn price_cart(
    cart: &Cart,
    book: &PriceBook,
    policy: &PricingPolicy,
) -> Result<CartTotals, PricingError> {
    if cart.is_empty() {
        return Ok(CartTotals::default());
    }

    let mut subtotal = Money::ZERO;
    let mut discount = Money::ZERO;
    for (item_id, quantity) in cart.iter() {
        let unit = book
            .get(&item_id)
            .ok_or(PricingError::UnknownItem(item_id))?;
        subtotal = unit
            .list
            .checked_mul(quantity)
            .and_then(|line| subtotal.checked_add(line))
            .ok_or(PricingError::Overflow)?;
        discount = unit
            .discount
            .checked_mul(quantity)
            .and_then(|line| discount.checked_add(line))
            .ok_or(PricingError::Overflow)?;
    }

    let taxable = subtotal.checked_sub(discount).ok_or(PricingError::Overflow)?;
    let tax = taxable
        .apply_bps(policy.tax_rate_bps)
        .ok_or(PricingError::Overflow)?;
    let total = taxable
        .checked_add(tax)
        .and_then(|value| value.checked_add(policy.delivery_fee))
        .ok_or(PricingError::Overflow)?;

    Ok(CartTotals {
        subtotal,
        discount,
        tax,
        delivery_fee: policy.delivery_fee,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::{price_cart, PriceBook, PricingError, PricingPolicy, UnitPrice};
    use crate::cart::state::Cart;
    use crate::model::money::{CartTotals, Money};
    use uuid::Uuid;

    fn policy(tax_rate_bps: u32, fee: i64) -> PricingPolicy {
        PricingPolicy {
            tax_rate_bps,
            delivery_fee: Money(fee),
        }
    }

    #[test]
    fn totals_follow_subtotal_tax_fee_identity() {
        let pizza = Uuid::new_v4();
        let soda = Uuid::new_v4();
        let mut book = PriceBook::new();
        book.insert(pizza, UnitPrice::undiscounted(Money(1200)));
        book.insert(soda, UnitPrice::undiscounted(Money(250)));

        let mut cart = Cart::new();
        cart.set_quantity(pizza, 2).unwrap();
        cart.set_quantity(soda, 3).unwrap();

        let totals = price_cart(&cart, &book, &policy(1000, 300)).unwrap();
        assert_eq!(totals.subtotal, Money(3150));
        assert_eq!(totals.discount, Money::ZERO);
        assert_eq!(totals.tax, Money(315));
        assert_eq!(totals.delivery_fee, Money(300));
        assert_eq!(totals.total, Money(3150 + 315 + 300));
    }

    #[test]
    fn discount_reduces_taxable_amount() {
        let item = Uuid::new_v4();
        let mut book = PriceBook::new();
        book.insert(
            item,
            UnitPrice {
                list: Money(1000),
                discount: Money(200),
            },
        );
        let mut cart = Cart::new();
        cart.set_quantity(item, 2).unwrap();

        let totals = price_cart(&cart, &book, &policy(500, 0)).unwrap();
        assert_eq!(totals.subtotal, Money(2000));
        assert_eq!(totals.discount, Money(400));
        assert_eq!(totals.tax, Money(80));
        assert_eq!(totals.total, Money(1680));
    }

    #[test]
    fn empty_cart_costs_nothing() {
        let totals = price_cart(&Cart::new(), &PriceBook::new(), &PricingPolicy::default()).unwrap();
        assert_eq!(totals, CartTotals::default());
    }

    #[test]
    fn unknown_item_is_rejected() {
        let item = Uuid::new_v4();
        let mut cart = Cart::new();
        cart.add(item).unwrap();
        let err = price_cart(&cart, &PriceBook::new(), &PricingPolicy::default()).unwrap_err();
        assert_eq!(err, PricingError::UnknownItem(item));
    }

    #[test]
    fn overflow_is_reported() {
        let item = Uuid::new_v4();
        let mut book = PriceBook::new();
        book.insert(item, UnitPrice::undiscounted(Money(i64::MAX / 2)));
        let mut cart = Cart::new();
        cart.set_quantity(item, 3).unwrap();
        let err = price_cart(&cart, &book, &PricingPolicy::default()).unwrap_err();
        assert_eq!(err, PricingError::Overflow);
    }
}
