//! Money and priced-cart totals.
//!
//! # Invariants
//! - Amounts are integer minor units (cents). No floating point arithmetic.
//! - All arithmetic used by pricing is checked; overflow surfaces as `None`.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Amount in minor currency units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    pub fn checked_mul(self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(i64::from(quantity)).map(Money)
    }

    /// Multiplies by a basis-point rate (`10_000` = 100%), rounding half up.
    pub fn apply_bps(self, bps: u32) -> Option<Money> {
        let scaled = self.0.checked_mul(i64::from(bps))?;
        let rounded = if scaled >= 0 {
            scaled.checked_add(5_000)? / 10_000
        } else {
            scaled.checked_sub(5_000)? / 10_000
        };
        Some(Money(rounded))
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// Result of pricing a cart or an order.
///
/// `total = subtotal - discount + tax + delivery_fee`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Sum of list price times quantity.
    pub subtotal: Money,
    /// Sum of per-unit offer discount times quantity.
    pub discount: Money,
    pub tax: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

#[cfg(test)]
mod tests {
    use super::Money;

    #[test]
    fn display_formats_minor_units() {
        assert_eq!(Money(1234).to_string(), "12.34");
        assert_eq!(Money(5).to_string(), "0.05");
        assert_eq!(Money(-105).to_string(), "-1.05");
    }

    #[test]
    fn apply_bps_rounds_half_up() {
        assert_eq!(Money(1000).apply_bps(825), Some(Money(83)));
        assert_eq!(Money(200).apply_bps(825), Some(Money(17)));
        assert_eq!(Money(0).apply_bps(825), Some(Money(0)));
    }

    #[test]
    fn checked_mul_reports_overflow() {
        assert_eq!(Money(i64::MAX).checked_mul(2), None);
    }
}
