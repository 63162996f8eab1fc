use thiserror::Error;

use crate::{EntityTag, RecordKey};

/// Errors that can occur when interacting with the record store.
#[derive(Debug, Error)]
pub enum RecordStoreError {
    /// The stored entity tag did not match the one supplied with an update.
    /// Another writer changed the record since it was read.
    #[error("Concurrency conflict for record {key}: expected tag {expected}, found {actual}")]
    ConcurrencyConflict {
        key: RecordKey,
        expected: EntityTag,
        actual: EntityTag,
    },

    /// The record does not exist.
    #[error("Record not found: {0}")]
    NotFound(RecordKey),

    /// The backing store refused or could not serve the request.
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RecordStoreError {
    /// Returns true if this error is an entity-tag mismatch.
    pub fn is_conflict(&self) -> bool {
        matches!(self, RecordStoreError::ConcurrencyConflict { .. })
    }
}

/// Result type for record store operations.
pub type Result<T> = std::result::Result<T, RecordStoreError>;
