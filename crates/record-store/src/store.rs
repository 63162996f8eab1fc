use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::{EntityTag, Record, RecordKey, Result};

/// Core trait for record store implementations.
///
/// Records are grouped by partition and addressed by row key within it.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetches a record.
    ///
    /// Returns None if no record exists at the key.
    async fn get(&self, partition: &str, row: &str) -> Result<Option<Record>>;

    /// Writes a record unconditionally, inserting or replacing.
    ///
    /// The store issues a fresh entity tag, which is returned.
    async fn put(&self, record: Record) -> Result<EntityTag>;

    /// Replaces a record only if its stored tag equals `etag`.
    ///
    /// Fails with `ConcurrencyConflict` when the tags differ and with
    /// `NotFound` when there is nothing to replace. Returns the new tag.
    async fn update_if_match(&self, record: Record, etag: EntityTag) -> Result<EntityTag>;

    /// Deletes a record.
    ///
    /// Returns whether a record existed. Deleting a missing key is not an error.
    async fn delete(&self, partition: &str, row: &str) -> Result<bool>;

    /// Retrieves every record in a partition, ordered by row key.
    async fn query_all(&self, partition: &str) -> Result<Vec<Record>>;
}

#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    async fn get(&self, partition: &str, row: &str) -> Result<Option<Record>> {
        (**self).get(partition, row).await
    }

    async fn put(&self, record: Record) -> Result<EntityTag> {
        (**self).put(record).await
    }

    async fn update_if_match(&self, record: Record, etag: EntityTag) -> Result<EntityTag> {
        (**self).update_if_match(record, etag).await
    }

    async fn delete(&self, partition: &str, row: &str) -> Result<bool> {
        (**self).delete(partition, row).await
    }

    async fn query_all(&self, partition: &str) -> Result<Vec<Record>> {
        (**self).query_all(partition).await
    }
}

/// A typed value that lives in the record store.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    /// Partition key the entity is stored under.
    fn partition_key(&self) -> String;

    /// Row key of the entity within its partition.
    fn row_key(&self) -> String;

    /// Full record key of the entity.
    fn record_key(&self) -> RecordKey {
        RecordKey::new(self.partition_key(), self.row_key())
    }
}

/// An entity together with the tag of the revision it was read from.
#[derive(Debug, Clone)]
pub struct Stored<E> {
    /// The decoded entity.
    pub entity: E,

    /// Tag to present when writing the entity back.
    pub etag: EntityTag,
}

impl<E> Stored<E> {
    /// Discards the tag.
    pub fn into_inner(self) -> E {
        self.entity
    }
}

fn to_record<E: Entity>(entity: &E) -> Result<Record> {
    Ok(Record::builder()
        .key(entity.record_key())
        .payload(entity)?
        .build())
}

/// Extension trait providing typed access on top of raw records.
#[async_trait]
pub trait RecordStoreExt: RecordStore {
    /// Loads and decodes an entity along with its current tag.
    async fn load<E: Entity>(&self, partition: &str, row: &str) -> Result<Option<Stored<E>>> {
        match self.get(partition, row).await? {
            Some(record) => Ok(Some(Stored {
                entity: record.decode()?,
                etag: record.etag,
            })),
            None => Ok(None),
        }
    }

    /// Writes an entity unconditionally.
    async fn save<E: Entity>(&self, entity: &E) -> Result<EntityTag> {
        self.put(to_record(entity)?).await
    }

    /// Writes an entity back only if it has not changed since it was read.
    async fn save_if_match<E: Entity>(&self, entity: &E, etag: EntityTag) -> Result<EntityTag> {
        self.update_if_match(to_record(entity)?, etag).await
    }

    /// Loads and decodes every entity in a partition.
    async fn load_all<E: Entity>(&self, partition: &str) -> Result<Vec<Stored<E>>> {
        let records = self.query_all(partition).await?;
        records
            .into_iter()
            .map(|record| {
                Ok(Stored {
                    entity: record.decode()?,
                    etag: record.etag,
                })
            })
            .collect()
    }
}

// Blanket implementation for all RecordStore implementations
impl<T: RecordStore + ?Sized> RecordStoreExt for T {}
