//! Checkout state, derived rather than stored.

use serde::{Deserialize, Serialize};

use super::Order;

/// Where an order sits in checkout.
///
/// ```text
/// Cart ──► AwaitingPayment ──► Completed
///   └──────────────────────────────▲
/// ```
///
/// No status field is persisted. An order with a tracking number is
/// completed; one with only a payment method is awaiting payment; anything
/// else is still a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckoutState {
    Cart,
    AwaitingPayment,
    Completed,
}

impl CheckoutState {
    /// Infers the state of an order.
    pub fn of(order: &Order) -> Self {
        let has_tracking = order
            .tracking_number
            .as_deref()
            .is_some_and(|t| !t.is_empty());

        if has_tracking {
            CheckoutState::Completed
        } else if order.payment_method.is_some() {
            CheckoutState::AwaitingPayment
        } else {
            CheckoutState::Cart
        }
    }

    /// Returns true once checkout has been finalized.
    pub fn is_completed(&self) -> bool {
        matches!(self, CheckoutState::Completed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Cart => "Cart",
            CheckoutState::AwaitingPayment => "AwaitingPayment",
            CheckoutState::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
