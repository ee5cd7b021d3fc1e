//! Type-safe price representation using decimal arithmetic.
//!
//! All money amounts in Bakehouse are rupee prices held as `rust_decimal`
//! values. Floats are never used for money.

use core::fmt;
use core::ops::{Add, AddAssign, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price in Indian rupees.
///
/// The storefront trades in a single currency, so the wrapper carries only
/// the amount. Arithmetic is exact decimal arithmetic.
///
/// # Examples
///
/// ```
/// use bakehouse_core::Price;
///
/// let unit = Price::from_rupees(450);
/// let line = unit * 2;
/// assert_eq!(line.display(), "₹900.00");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of rupees.
    #[must_use]
    pub fn from_rupees(rupees: i64) -> Self {
        Self(Decimal::new(rupees, 0))
    }

    /// Create a price from paise (hundredths of a rupee).
    #[must_use]
    pub fn from_paise(paise: i64) -> Self {
        Self(Decimal::new(paise, 2))
    }

    /// The zero price.
    #[must_use]
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format for display with the currency symbol (e.g., "₹499.00").
    #[must_use]
    pub fn display(&self) -> String {
        format!("₹{:.2}", self.0)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, qty: u32) -> Self {
        Self(self.0 * Decimal::from(qty))
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rate: Decimal) -> Self {
        Self(self.0 * rate)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rupees_displays_two_decimals() {
        assert_eq!(Price::from_rupees(500).display(), "₹500.00");
        assert_eq!(Price::from_paise(49950).display(), "₹499.50");
    }

    #[test]
    fn test_arithmetic_is_exact() {
        // 0.1 + 0.2 is exactly 0.3 in decimal arithmetic
        let total = Price::from_paise(10) + Price::from_paise(20);
        assert_eq!(total, Price::from_paise(30));
    }

    #[test]
    fn test_multiply_by_quantity() {
        let line = Price::from_paise(33325) * 3;
        assert_eq!(line.display(), "₹999.75");
    }

    #[test]
    fn test_ordering() {
        assert!(Price::from_rupees(499) < Price::from_rupees(500));
        assert_eq!(Price::zero(), Price::from_rupees(0));
    }
}
