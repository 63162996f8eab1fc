//! Order pricing.
//!
//! Totals are always recomputed from the full line-item set. The effective
//! shipping fee is the constant [`SHIPPING_FEE`]; the fee stored on an order
//! is carried for display but never enters the calculation. Arithmetic is
//! checked: a set whose amounts overflow has no totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::order::LineItem;
use crate::value_objects::Money;

/// Flat tax rate (15%).
pub const TAX_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// Effective shipping fee (R200.00).
pub const SHIPPING_FEE: Money = Money::shipping_constant();

/// Result of pricing a line-item set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Money,
    pub tax: Money,
    pub shipping: Money,
    pub total: Money,
}

impl Totals {
    /// Totals of an empty cart.
    pub fn empty() -> Self {
        Self {
            subtotal: Money::zero(),
            tax: Money::zero(),
            shipping: SHIPPING_FEE,
            total: SHIPPING_FEE,
        }
    }
}

/// Computes subtotal, tax, shipping and grand total for a set of line items.
///
/// Returns `None` if any line total or sum overflows.
pub fn calculate_totals(items: &[LineItem]) -> Option<Totals> {
    let subtotal = items.iter().try_fold(Money::zero(), |acc, item| {
        acc.checked_add(item.line_total()?)
    })?;
    let tax = subtotal.apply_rate(TAX_RATE);
    let shipping = SHIPPING_FEE;

    Some(Totals {
        subtotal,
        tax,
        shipping,
        total: subtotal.checked_add(tax)?.checked_add(shipping)?,
    })
}
