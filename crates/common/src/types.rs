use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of a generated order identifier.
pub const ORDER_ID_LEN: usize = 8;

/// Identifier of an order (and therefore of a cart, since a cart is an
/// order that has not been checked out yet).
///
/// Generated identifiers are short: the first eight hex digits of a random
/// UUID, upper-cased. Identifiers arriving from outside go through
/// [`OrderId::parse`], which only accepts that shape.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Creates a new random order ID.
    pub fn new() -> Self {
        let raw = Uuid::new_v4().simple().to_string();
        Self(raw.chars().take(ORDER_ID_LEN).collect::<String>().to_uppercase())
    }

    /// Parses an identifier supplied by a caller.
    ///
    /// Returns `None` unless `raw` is eight upper-case hex digits.
    pub fn parse(raw: &str) -> Option<Self> {
        let well_formed = raw.len() == ORDER_ID_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b));
        well_formed.then(|| Self(raw.to_string()))
    }

    /// Wraps an existing identifier without checking its shape.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for OrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_new_is_short_and_uppercase() {
        let id = OrderId::new();
        assert_eq!(id.as_str().len(), ORDER_ID_LEN);
        assert!(
            id.as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    #[test]
    fn order_id_new_creates_unique_ids() {
        let id1 = OrderId::new();
        let id2 = OrderId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn parse_accepts_generated_ids() {
        let id = OrderId::new();
        assert_eq!(OrderId::parse(id.as_str()), Some(id));
        assert_eq!(
            OrderId::parse("0A1B2C3D").map(|id| id.to_string()),
            Some("0A1B2C3D".to_string())
        );
    }

    #[test]
    fn parse_rejects_malformed_ids() {
        for raw in [
            "",
            "ORDER",
            "PRODUCT",
            "CUSTOMER",
            "0a1b2c3d",
            "0A1B2C3D4",
            "0A1B 2C3",
            "../0A1B2",
        ] {
            assert!(OrderId::parse(raw).is_none(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn order_id_from_string_preserves_value() {
        let id = OrderId::from_string("A1B2C3D4");
        assert_eq!(id.as_str(), "A1B2C3D4");
        assert_eq!(id.to_string(), "A1B2C3D4");
    }

    #[test]
    fn order_id_serializes_as_plain_string() {
        let id = OrderId::from("ABCDEF12");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"ABCDEF12\"");
    }
}
