//! Record validation errors.

use crate::model::menu::ItemId;
use crate::model::money::Money;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure for a domain record about to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required display name is blank after trim.
    BlankName { entity: &'static str },
    /// Item price must not be negative.
    NegativePrice(Money),
    /// Percent discount must be within `1..=100`.
    PercentOutOfRange(u8),
    /// Flat discount must be strictly positive.
    NonPositiveFlat(Money),
    /// An order must contain at least one line.
    EmptyOrder,
    /// Order lines must carry a quantity of at least one.
    ZeroQuantity(ItemId),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName { entity } => write!(f, "{entity} name must not be blank"),
            Self::NegativePrice(price) => write!(f, "price must not be negative, got {price}"),
            Self::PercentOutOfRange(value) => {
                write!(f, "percent discount must be within 1..=100, got {value}")
            }
            Self::NonPositiveFlat(value) => {
                write!(f, "flat discount must be positive, got {value}")
            }
            Self::EmptyOrder => write!(f, "order must contain at least one line"),
            Self::ZeroQuantity(item_id) => {
                write!(f, "order line quantity must be at least 1 for item {item_id}")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_name(value: &str, entity: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankName { entity });
    }
    Ok(())
}
