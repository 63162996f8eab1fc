//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p record-store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use record_store::{
    Entity, EntityTag, PostgresRecordStore, Record, RecordStore, RecordStoreError,
    RecordStoreExt,
};
use serde::{Deserialize, Serialize};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_records_table.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and a cleared table
async fn get_test_store() -> PostgresRecordStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE records")
        .execute(&pool)
        .await
        .unwrap();

    PostgresRecordStore::new(pool)
}

fn create_test_record(partition: &str, row: &str, value: i64) -> Record {
    Record::builder()
        .partition(partition)
        .row(row)
        .payload_raw(serde_json::json!({ "value": value }))
        .build()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StockLevel {
    sku: String,
    on_hand: i64,
}

impl Entity for StockLevel {
    fn partition_key(&self) -> String {
        "STOCK".to_string()
    }

    fn row_key(&self) -> String {
        self.sku.clone()
    }
}

#[tokio::test]
#[serial]
async fn put_and_get_roundtrip() {
    let store = get_test_store().await;

    let etag = store.put(create_test_record("P", "r1", 7)).await.unwrap();
    let record = store.get("P", "r1").await.unwrap().unwrap();

    assert_eq!(record.etag, etag);
    assert_eq!(record.payload["value"], 7);
}

#[tokio::test]
#[serial]
async fn put_replaces_existing_record() {
    let store = get_test_store().await;

    let first = store.put(create_test_record("P", "r1", 1)).await.unwrap();
    let second = store.put(create_test_record("P", "r1", 2)).await.unwrap();

    assert_ne!(first, second);
    let all = store.query_all("P").await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].payload["value"], 2);
}

#[tokio::test]
#[serial]
async fn update_if_match_with_current_tag() {
    let store = get_test_store().await;

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
#[serial]
async fn update_if_match_with_stale_tag_conflicts() {
    let store = get_test_store().await;

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
}

#[tokio::test]
#[serial]
async fn update_if_match_missing_record() {
    let store = get_test_store().await;

    let result = store
        .update_if_match(create_test_record("P", "nope", 1), EntityTag::new())
        .await;

    assert!(matches!(result, Err(RecordStoreError::NotFound(_))));
}

#[tokio::test]
#[serial]
async fn delete_and_query_partition() {
    let store = get_test_store().await;

    store.put(create_test_record("ORDER-1", "b", 2)).await.unwrap();
    store.put(create_test_record("ORDER-1", "a", 1)).await.unwrap();
    store.put(create_test_record("ORDER-2", "a", 9)).await.unwrap();

    let rows: Vec<String> = store
        .query_all("ORDER-1")
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.key.row)
        .collect();
    assert_eq!(rows, vec!["a".to_string(), "b".to_string()]);

    assert!(store.delete("ORDER-1", "a").await.unwrap());
    assert!(!store.delete("ORDER-1", "a").await.unwrap());
    assert_eq!(store.query_all("ORDER-1").await.unwrap().len(), 1);
}

#[tokio::test]
#[serial]
async fn typed_entities_through_extension() {
    let store = get_test_store().await;

    let level = StockLevel {
        sku: "SKU-1".to_string(),
        on_hand: 12,
    };
    store.save(&level).await.unwrap();

    let mut stored = store
        .load::<StockLevel>("STOCK", "SKU-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.entity, level);

    stored.entity.on_hand -= 5;
    store
        .save_if_match(&stored.entity, stored.etag)
        .await
        .unwrap();

    let reloaded = store.load_all::<StockLevel>("STOCK").await.unwrap();
    assert_eq!(reloaded[0].entity.on_hand, 7);
}
