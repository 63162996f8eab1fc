use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque concurrency token attached to every stored record.
///
/// A new tag is issued on every successful write, so two readers holding the
/// same tag saw the same revision of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityTag(Uuid);

impl EntityTag {
    /// Creates a new random entity tag.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an entity tag from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EntityTag {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for EntityTag {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Address of a record: a partition key plus a row key unique within it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    /// Partition key (e.g. "ORDER", or an order ID for line items).
    pub partition: String,

    /// Row key, unique within the partition.
    pub row: String,
}

impl RecordKey {
    /// Creates a new record key.
    pub fn new(partition: impl Into<String>, row: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            row: row.into(),
        }
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.partition, self.row)
    }
}

/// A stored record with its concurrency tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Where the record lives.
    pub key: RecordKey,

    /// Tag of the revision this record represents.
    pub etag: EntityTag,

    /// When the record was last written.
    pub timestamp: DateTime<Utc>,

    /// The record payload as JSON.
    pub payload: serde_json::Value,
}

impl Record {
    /// Creates a new record builder.
    pub fn builder() -> RecordBuilder {
        RecordBuilder::default()
    }

    /// Deserializes the payload into a typed value.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

/// Builder for constructing records.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    partition: Option<String>,
    row: Option<String>,
    etag: Option<EntityTag>,
    timestamp: Option<DateTime<Utc>>,
    payload: Option<serde_json::Value>,
}

impl RecordBuilder {
    /// Sets the partition key.
    pub fn partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = Some(partition.into());
        self
    }

    /// Sets the row key.
    pub fn row(mut self, row: impl Into<String>) -> Self {
        self.row = Some(row.into());
        self
    }

    /// Sets both keys from a [`RecordKey`].
    pub fn key(self, key: RecordKey) -> Self {
        self.partition(key.partition).row(key.row)
    }

    /// Sets the entity tag. If not set, a new tag will be generated.
    pub fn etag(mut self, etag: EntityTag) -> Self {
        self.etag = Some(etag);
        self
    }

    /// Sets the timestamp. If not set, the current time will be used.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the payload from a serializable value.
    pub fn payload<T: Serialize>(mut self, payload: &T) -> Result<Self, serde_json::Error> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    /// Sets the payload from a raw JSON value.
    pub fn payload_raw(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Builds the record.
    ///
    /// # Panics
    ///
    /// Panics if the partition, row or payload are not set.
    pub fn build(self) -> Record {
        Record {
            key: RecordKey {
                partition: self.partition.expect("partition is required"),
                row: self.row.expect("row is required"),
            },
            etag: self.etag.unwrap_or_default(),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            payload: self.payload.expect("payload is required"),
        }
    }

    /// Tries to build the record, returning None if required fields are missing.
    pub fn try_build(self) -> Option<Record> {
        Some(Record {
            key: RecordKey {
                partition: self.partition?,
                row: self.row?,
            },
            etag: self.etag.unwrap_or_default(),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            payload: self.payload?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_tag_new_creates_unique_tags() {
        assert_ne!(EntityTag::new(), EntityTag::new());
    }

    #[test]
    fn record_key_display() {
        let key = RecordKey::new("ORDER", "AB12CD34");
        assert_eq!(key.to_string(), "ORDER/AB12CD34");
    }

    #[test]
    fn record_keys_order_by_partition_then_row() {
        let a = RecordKey::new("A", "2");
        let b = RecordKey::new("A", "10");
        let c = RecordKey::new("B", "1");
        assert!(b < a);
        assert!(a < c);
    }

    #[test]
    fn record_builder() {
        let payload = serde_json::json!({"name": "Widget"});
        let record = Record::builder()
            .partition("PRODUCT")
            .row("p-1")
            .payload_raw(payload.clone())
            .build();

        assert_eq!(record.key, RecordKey::new("PRODUCT", "p-1"));
        assert_eq!(record.payload, payload);
    }

    #[test]
    fn record_builder_try_build_returns_none_on_missing_fields() {
        assert!(Record::builder().try_build().is_none());
        assert!(Record::builder().partition("ORDER").try_build().is_none());
    }

    #[test]
    fn record_decode_typed_payload() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Widget {
            name: String,
        }

        let record = Record::builder()
            .partition("PRODUCT")
            .row("p-1")
            .payload(&Widget {
                name: "Widget".to_string(),
            })
            .unwrap()
            .build();

        let widget: Widget = record.decode().unwrap();
        assert_eq!(widget.name, "Widget");
    }
}
