use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{EntityTag, Record, RecordKey, RecordStoreError, Result, store::RecordStore};

#[derive(Debug, Default)]
struct Faults {
    unavailable: bool,
    failing_partitions: HashSet<String>,
    unreadable_partitions: HashSet<String>,
}

/// In-memory record store implementation for testing and local runs.
///
/// Provides the same interface and tag semantics as the PostgreSQL store.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<BTreeMap<RecordKey, Record>>>,
    faults: Arc<RwLock<Faults>>,
}

impl InMemoryRecordStore {
    /// Creates a new empty in-memory record store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of records stored.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Clears all records.
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }

    /// Makes every operation fail with `Unavailable` while set.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.faults.write().await.unavailable = unavailable;
    }

    /// Makes writes (put, update, delete) to one partition fail.
    pub async fn fail_writes_to(&self, partition: impl Into<String>) {
        self.faults
            .write()
            .await
            .failing_partitions
            .insert(partition.into());
    }

    /// Makes reads (get, query_all) from one partition fail.
    pub async fn fail_reads_from(&self, partition: impl Into<String>) {
        self.faults
            .write()
            .await
            .unreadable_partitions
            .insert(partition.into());
    }

    /// Removes all injected failures.
    pub async fn clear_faults(&self) {
        *self.faults.write().await = Faults::default();
    }

    async fn check_read(&self, partition: &str) -> Result<()> {
        let faults = self.faults.read().await;
        if faults.unavailable {
            return Err(RecordStoreError::Unavailable(
                "store marked unavailable".to_string(),
            ));
        }
        if faults.unreadable_partitions.contains(partition) {
            return Err(RecordStoreError::Unavailable(format!(
                "reads from partition {partition} are failing"
            )));
        }
        Ok(())
    }

    async fn check_write(&self, partition: &str) -> Result<()> {
        let faults = self.faults.read().await;
        if faults.unavailable || faults.failing_partitions.contains(partition) {
            return Err(RecordStoreError::Unavailable(format!(
                "writes to partition {partition} are failing"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get(&self, partition: &str, row: &str) -> Result<Option<Record>> {
        self.check_read(partition).await?;
        let store = self.records.read().await;
        Ok(store.get(&RecordKey::new(partition, row)).cloned())
    }

    async fn put(&self, mut record: Record) -> Result<EntityTag> {
        self.check_write(&record.key.partition).await?;

        let etag = EntityTag::new();
        record.etag = etag;
        record.timestamp = Utc::now();

        let mut store = self.records.write().await;
        store.insert(record.key.clone(), record);
        Ok(etag)
    }

    async fn update_if_match(&self, mut record: Record, etag: EntityTag) -> Result<EntityTag> {
        self.check_write(&record.key.partition).await?;

        let mut store = self.records.write().await;
        let current = store
            .get(&record.key)
            .ok_or_else(|| RecordStoreError::NotFound(record.key.clone()))?;

        if current.etag != etag {
            metrics::counter!("record_store_conflicts_total").increment(1);
            return Err(RecordStoreError::ConcurrencyConflict {
                key: record.key.clone(),
                expected: etag,
                actual: current.etag,
            });
        }

        let new_etag = EntityTag::new();
        record.etag = new_etag;
        record.timestamp = Utc::now();
        store.insert(record.key.clone(), record);
        Ok(new_etag)
    }

    async fn delete(&self, partition: &str, row: &str) -> Result<bool> {
        self.check_write(partition).await?;
        let mut store = self.records.write().await;
        Ok(store.remove(&RecordKey::new(partition, row)).is_some())
    }

    async fn query_all(&self, partition: &str) -> Result<Vec<Record>> {
        self.check_read(partition).await?;
        let store = self.records.read().await;
        Ok(store
            .values()
            .filter(|r| r.key.partition == partition)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Entity, RecordStoreExt};
    use serde::{Deserialize, Serialize};

    fn create_test_record(partition: &str, row: &str, value: i64) -> Record {
        Record::builder()
            .partition(partition)
            .row(row)
            .payload_raw(serde_json::json!({ "value": value }))
            .build()
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        id: String,
        value: i64,
    }

    impl Entity for Counter {
        fn partition_key(&self) -> String {
            "COUNTER".to_string()
        }

        fn row_key(&self) -> String {
            self.id.clone()
        }
    }

    #[tokio::test]
    async fn put_then_get() {
        let store = InMemoryRecordStore::new();
        let etag = store.put(create_test_record("P", "r1", 1)).await.unwrap();

        let record = store.get("P", "r1").await.unwrap().unwrap();
        assert_eq!(record.etag, etag);
        assert_eq!(record.payload["value"], 1);
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = InMemoryRecordStore::new();
        assert!(store.get("P", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_issues_new_tag_each_write() {
        let store = InMemoryRecordStore::new();
        let first = store.put(create_test_record("P", "r1", 1)).await.unwrap();
        let second = store.put(create_test_record("P", "r1", 2)).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(store.record_count().await, 1);
    }

    #[tokio::test]
    async fn update_if_match_succeeds_with_current_tag() {
        let store = InMemoryRecordStore::new();
        let etag = store.put(create_test_record("P", "r1", 1)).await.unwrap();

        let new_etag = store
            .update_if_match(create_test_record("P", "r1", 2), etag)
            .await
            .unwrap();

        let record = store.get("P", "r1").await.unwrap().unwrap();
        assert_eq!(record.etag, new_etag);
        assert_eq!(record.payload["value"], 2);
    }

    #[tokio::test]
    async fn update_if_match_conflicts_on_stale_tag() {
        let store = InMemoryRecordStore::new();
        let stale = store.put(create_test_record("P", "r1", 1)).await.unwrap();
        store
            .update_if_match(create_test_record("P", "r1", 2), stale)
            .await
            .unwrap();

        let result = store
            .update_if_match(create_test_record("P", "r1", 3), stale)
            .await;

        assert!(matches!(
            result,
            Err(RecordStoreError::ConcurrencyConflict { .. })
        ));
        let record = store.get("P", "r1").await.unwrap().unwrap();
        assert_eq!(record.payload["value"], 2);
    }

    #[tokio::test]
    async fn update_if_match_missing_record_is_not_found() {
        let store = InMemoryRecordStore::new();
        let result = store
            .update_if_match(create_test_record("P", "r1", 1), EntityTag::new())
            .await;
        assert!(matches!(result, Err(RecordStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let store = InMemoryRecordStore::new();
        store.put(create_test_record("P", "r1", 1)).await.unwrap();

        assert!(store.delete("P", "r1").await.unwrap());
        assert!(!store.delete("P", "r1").await.unwrap());
        assert_eq!(store.record_count().await, 0);
    }

    #[tokio::test]
    async fn query_all_filters_partition_and_orders_rows() {
        let store = InMemoryRecordStore::new();
        store.put(create_test_record("A", "b", 2)).await.unwrap();
        store.put(create_test_record("B", "a", 9)).await.unwrap();
        store.put(create_test_record("A", "a", 1)).await.unwrap();

        let records = store.query_all("A").await.unwrap();
        let rows: Vec<_> = records.iter().map(|r| r.key.row.as_str()).collect();
        assert_eq!(rows, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn injected_write_failure_only_hits_named_partition() {
        let store = InMemoryRecordStore::new();
        store.fail_writes_to("PRODUCT").await;

        let result = store.put(create_test_record("PRODUCT", "p1", 1)).await;
        assert!(matches!(result, Err(RecordStoreError::Unavailable(_))));
        assert!(store.put(create_test_record("ORDER", "o1", 1)).await.is_ok());

        store.clear_faults().await;
        assert!(store.put(create_test_record("PRODUCT", "p1", 1)).await.is_ok());
    }

    #[tokio::test]
    async fn injected_read_failure_only_hits_named_partition() {
        let store = InMemoryRecordStore::new();
        store.put(create_test_record("A", "a", 1)).await.unwrap();
        store.put(create_test_record("B", "b", 2)).await.unwrap();
        store.fail_reads_from("A").await;

        assert!(store.query_all("A").await.is_err());
        assert!(store.get("A", "a").await.is_err());
        assert_eq!(store.query_all("B").await.unwrap().len(), 1);
        assert!(store.put(create_test_record("A", "c", 3)).await.is_ok());
    }

    #[tokio::test]
    async fn unavailable_store_fails_reads() {
        let store = InMemoryRecordStore::new();
        store.set_unavailable(true).await;
        assert!(store.query_all("ORDER").await.is_err());
        assert!(store.get("ORDER", "x").await.is_err());
    }

    #[tokio::test]
    async fn typed_load_and_save_if_match() {
        let store = InMemoryRecordStore::new();
        let counter = Counter {
            id: "c1".to_string(),
            value: 1,
        };
        store.save(&counter).await.unwrap();

        let mut stored = store.load::<Counter>("COUNTER", "c1").await.unwrap().unwrap();
        assert_eq!(stored.entity, counter);

        stored.entity.value = 5;
        store
            .save_if_match(&stored.entity, stored.etag)
            .await
            .unwrap();

        let all = store.load_all::<Counter>("COUNTER").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].entity.value, 5);
    }
}
