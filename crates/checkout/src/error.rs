//! Checkout error types.

use common::OrderId;
use domain::DomainError;
use record_store::RecordStoreError;
use thiserror::Error;

/// Errors that can occur during checkout and its side effects.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Credit checkout without a contract document.
    #[error("Contract file is required for credit payments")]
    ContractRequired,

    /// The contract document was rejected (type or size).
    #[error("{0}")]
    InvalidDocument(String),

    /// The contract could not be stored.
    #[error("Error uploading contract: {0}")]
    UploadFailed(String),

    /// Document store error.
    #[error("Document store error: {0}")]
    DocumentStore(String),

    /// A stored document does not exist.
    #[error("Document not found: {directory}/{file_name}")]
    DocumentNotFound {
        directory: String,
        file_name: String,
    },

    /// Notification channel error.
    #[error("Notification error: {0}")]
    Notification(String),

    /// Domain error.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Record store error.
    #[error("Record store error: {0}")]
    Store(#[from] RecordStoreError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CheckoutError {
    /// Returns true for errors shown to the user as a correctable message,
    /// with the order left editable.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CheckoutError::ContractRequired
                | CheckoutError::InvalidDocument(_)
                | CheckoutError::UploadFailed(_)
        )
    }

    /// Returns true if the order, product or document is missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            CheckoutError::OrderNotFound(_) | CheckoutError::DocumentNotFound { .. } => true,
            CheckoutError::Domain(e) => e.is_not_found(),
            CheckoutError::Store(RecordStoreError::NotFound(_)) => true,
            _ => false,
        }
    }

    /// Returns true if a compare-and-swap write lost to another writer.
    pub fn is_conflict(&self) -> bool {
        match self {
            CheckoutError::Store(e) => e.is_conflict(),
            CheckoutError::Domain(e) => e.is_conflict(),
            _ => false,
        }
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
