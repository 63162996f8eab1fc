//! Domain error types.

use common::OrderId;
use record_store::RecordStoreError;
use thiserror::Error;

use crate::value_objects::{CustomerId, ProductId};

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the record store.
    #[error("Record store error: {0}")]
    Store(#[from] RecordStoreError),

    /// The order (or the cart bound to a handle) no longer exists.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// Invalid quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// The order's amounts no longer fit the currency type.
    #[error("Order amounts out of range: {0}")]
    AmountOverflow(OrderId),

    #[error("Unknown payment method: {0}")]
    InvalidPaymentMethod(String),

    /// A required field is missing or malformed.
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl DomainError {
    /// Returns true for the recoverable "missing entity" family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::OrderNotFound(_)
                | DomainError::ProductNotFound(_)
                | DomainError::CustomerNotFound(_)
                | DomainError::Store(RecordStoreError::NotFound(_))
        )
    }

    /// Returns true if a compare-and-swap write lost to another writer.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DomainError::Store(e) if e.is_conflict())
    }
}
