//! Pricing offers applied to one item or a whole category.

use crate::model::menu::{CategoryId, ItemId};
use crate::model::money::Money;
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type OfferId = Uuid;

/// What an offer applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum OfferTarget {
    Item(ItemId),
    Category(CategoryId),
}

/// Discount rule of an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Discount {
    /// Whole percent off the list price, `1..=100`.
    Percent(u8),
    /// Fixed amount off the list price.
    Flat(Money),
}

impl Discount {
    /// Amount taken off one unit at `price`, never more than `price` itself.
    pub fn amount_off(self, price: Money) -> Money {
        if price.cents() <= 0 {
            return Money::ZERO;
        }
        let raw = match self {
            Self::Percent(pct) => price.apply_bps(u32::from(pct) * 100).unwrap_or(price),
            Self::Flat(amount) => amount,
        };
        Money(raw.cents().clamp(0, price.cents()))
    }

    pub fn validate(self) -> Result<(), ValidationError> {
        match self {
            Self::Percent(pct) if pct == 0 || pct > 100 => {
                Err(ValidationError::PercentOutOfRange(pct))
            }
            Self::Flat(amount) if amount.cents() <= 0 => {
                Err(ValidationError::NonPositiveFlat(amount))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: OfferId,
    pub target: OfferTarget,
    pub discount: Discount,
    pub title: String,
    pub is_active: bool,
}

impl Offer {
    pub fn new(target: OfferTarget, discount: Discount, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            target,
            discount,
            title: title.into(),
            is_active: true,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.discount.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::{Discount, Offer, OfferTarget};
    use crate::model::money::Money;
    use crate::model::validation::ValidationError;
    use uuid::Uuid;

    #[test]
    fn percent_discount_rounds_half_up() {
        assert_eq!(Discount::Percent(15).amount_off(Money(999)), Money(150));
        assert_eq!(Discount::Percent(100).amount_off(Money(999)), Money(999));
    }

    #[test]
    fn flat_discount_is_capped_at_price() {
        assert_eq!(Discount::Flat(Money(500)).amount_off(Money(300)), Money(300));
        assert_eq!(Discount::Flat(Money(100)).amount_off(Money(300)), Money(100));
    }

    #[test]
    fn out_of_range_discounts_fail_validation() {
        let item = OfferTarget::Item(Uuid::new_v4());
        assert_eq!(
            Offer::new(item, Discount::Percent(0), "none").validate(),
            Err(ValidationError::PercentOutOfRange(0))
        );
        assert_eq!(
            Offer::new(item, Discount::Percent(101), "too much").validate(),
            Err(ValidationError::PercentOutOfRange(101))
        );
        assert_eq!(
            Offer::new(item, Discount::Flat(Money(0)), "free").validate(),
            Err(ValidationError::NonPositiveFlat(Money(0)))
        );
    }

    #[test]
    fn target_serializes_with_kind_tag() {
        let id = Uuid::nil();
        let json = serde_json::to_value(OfferTarget::Category(id)).unwrap();
        assert_eq!(json["kind"], "category");
        assert_eq!(json["id"], id.to_string());
    }
}
