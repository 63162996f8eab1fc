use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{EntityTag, Record, RecordKey, RecordStoreError, Result, store::RecordStore};

/// PostgreSQL-backed record store implementation.
#[derive(Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    /// Creates a new PostgreSQL record store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `url` with a default pool.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_record(row: PgRow) -> Result<Record> {
        Ok(Record {
            key: RecordKey {
                partition: row.try_get("partition")?,
                row: row.try_get("row_key")?,
            },
            etag: EntityTag::from_uuid(row.try_get::<Uuid, _>("etag")?),
            timestamp: row.try_get("updated_at")?,
            payload: row.try_get("payload")?,
        })
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn get(&self, partition: &str, row: &str) -> Result<Option<Record>> {
        let row = sqlx::query(
            r#"
            SELECT partition, row_key, etag, updated_at, payload
            FROM records
            WHERE partition = $1 AND row_key = $2
            "#,
        )
        .bind(partition)
        .bind(row)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_record).transpose()
    }

    #[tracing::instrument(skip(self, record), fields(key = %record.key))]
    async fn put(&self, record: Record) -> Result<EntityTag> {
        let etag = EntityTag::new();

        sqlx::query(
            r#"
            INSERT INTO records (partition, row_key, etag, updated_at, payload)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (partition, row_key)
            DO UPDATE SET etag = EXCLUDED.etag, updated_at = EXCLUDED.updated_at, payload = EXCLUDED.payload
            "#,
        )
        .bind(&record.key.partition)
        .bind(&record.key.row)
        .bind(etag.as_uuid())
        .bind(Utc::now())
        .bind(&record.payload)
        .execute(&self.pool)
        .await?;

        Ok(etag)
    }

    #[tracing::instrument(skip(self, record), fields(key = %record.key))]
    async fn update_if_match(&self, record: Record, etag: EntityTag) -> Result<EntityTag> {
        let new_etag = EntityTag::new();

        let updated = sqlx::query(
            r#"
            UPDATE records
            SET etag = $3, updated_at = $4, payload = $5
            WHERE partition = $1 AND row_key = $2 AND etag = $6
            "#,
        )
        .bind(&record.key.partition)
        .bind(&record.key.row)
        .bind(new_etag.as_uuid())
        .bind(Utc::now())
        .bind(&record.payload)
        .bind(etag.as_uuid())
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 1 {
            return Ok(new_etag);
        }

        // Nothing matched: tell a missing record apart from a stale tag
        let current: Option<Uuid> =
            sqlx::query_scalar("SELECT etag FROM records WHERE partition = $1 AND row_key = $2")
                .bind(&record.key.partition)
                .bind(&record.key.row)
                .fetch_optional(&self.pool)
                .await?;

        match current {
            Some(actual) => {
                metrics::counter!("record_store_conflicts_total").increment(1);
                tracing::debug!(expected = %etag, actual = %actual, "entity tag mismatch");
                Err(RecordStoreError::ConcurrencyConflict {
                    key: record.key,
                    expected: etag,
                    actual: EntityTag::from_uuid(actual),
                })
            }
            None => Err(RecordStoreError::NotFound(record.key)),
        }
    }

    async fn delete(&self, partition: &str, row: &str) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM records WHERE partition = $1 AND row_key = $2")
            .bind(partition)
            .bind(row)
            .execute(&self.pool)
            .await?;

        Ok(deleted.rows_affected() > 0)
    }

    async fn query_all(&self, partition: &str) -> Result<Vec<Record>> {
        let rows = sqlx::query(
            r#"
            SELECT partition, row_key, etag, updated_at, payload
            FROM records
            WHERE partition = $1
            ORDER BY row_key ASC
            "#,
        )
        .bind(partition)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_record).collect()
    }
}
