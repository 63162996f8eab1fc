//! Record store for the storefront checkout system.
//!
//! Records are JSON payloads addressed by a partition key and a row key.
//! Every write stamps a fresh [`EntityTag`]; conditional updates compare the
//! caller's tag with the stored one and refuse the write on mismatch.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod store;

pub use error::{RecordStoreError, Result};
pub use memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;
pub use record::{EntityTag, Record, RecordBuilder, RecordKey};
pub use store::{Entity, RecordStore, RecordStoreExt, Stored};
