//! Value objects shared by orders and the catalog.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product identifier (row key in the `PRODUCT` partition).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a product ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh 32-character hex product ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Returns the product ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Customer identifier (row key in the `CUSTOMER` partition).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    /// Creates a customer ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh 32-character hex customer ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Returns the customer ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CustomerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CustomerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for CustomerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An exact currency amount in rand.
///
/// Backed by a decimal so that sums and the 15% tax never pick up binary
/// rounding error. Amounts keep full precision internally and are rounded to
/// cents only for display.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Builds an amount from whole rand and cents, the way product prices
    /// are captured.
    pub fn from_parts(rand: i64, cents: i64) -> Self {
        Self(Decimal::from(rand) + Decimal::new(cents, 2))
    }

    pub(crate) const fn shipping_constant() -> Self {
        Self(Decimal::from_parts(20000, 0, 0, false, 2))
    }

    /// Creates an amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Wraps a decimal amount.
    pub fn from_decimal(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Returns the exact decimal amount.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Multiplies by a quantity, or `None` if the result overflows.
    pub fn checked_multiply(&self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(Decimal::from(quantity)).map(Money)
    }

    /// Adds two amounts, or `None` if the result overflows.
    pub fn checked_add(&self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Applies a rate such as a tax percentage.
    pub fn apply_rate(&self, rate: Decimal) -> Money {
        Money(self.0 * rate)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(2);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            write!(f, "-R{}", rounded.abs())
        } else {
            write!(f, "R{}", rounded.abs())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_32_hex_chars() {
        let id = ProductId::generate();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(CustomerId::generate(), CustomerId::generate());
    }

    #[test]
    fn money_from_two_part_price() {
        assert_eq!(Money::from_parts(5, 50), Money::from_cents(550));
        assert_eq!(Money::from_parts(10, 0).amount(), Decimal::from(10));
    }

    #[test]
    fn money_checked_arithmetic() {
        let line = Money::from_cents(1000).checked_multiply(2).unwrap();
        let total = line.checked_add(Money::from_cents(550)).unwrap();
        assert_eq!(total, Money::from_cents(2550));
    }

    #[test]
    fn money_overflow_is_reported_not_panicked() {
        let huge = Money::from_decimal(Decimal::MAX);
        assert!(huge.checked_multiply(2).is_none());
        assert!(huge.checked_add(Money::from_cents(1)).is_none());
        assert_eq!(huge.checked_multiply(1), Some(huge));
    }

    #[test]
    fn money_rate_is_exact() {
        let tax = Money::from_cents(2550).apply_rate(Decimal::new(15, 2));
        assert_eq!(tax.amount(), Decimal::new(3825, 3));
    }

    #[test]
    fn money_display() {
        assert_eq!(Money::from_cents(2550).to_string(), "R25.50");
        assert_eq!(Money::from_decimal(Decimal::new(3825, 3)).to_string(), "R3.83");
        assert_eq!(Money::from_cents(-150).to_string(), "-R1.50");
        assert_eq!(Money::zero().to_string(), "R0.00");
    }
}
