//! UPS-style tracking numbers.

use serde::{Deserialize, Serialize};

use crate::random::RandomSource;

const PREFIX: &str = "1Z";
const SUFFIX_LEN: usize = 10;
const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A carrier tracking number: `1Z` followed by ten of `[A-Z0-9]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingNumber(String);

impl TrackingNumber {
    /// Draws a new tracking number, each suffix character uniformly.
    pub fn generate(rng: &dyn RandomSource) -> Self {
        let mut value = String::with_capacity(PREFIX.len() + SUFFIX_LEN);
        value.push_str(PREFIX);
        for _ in 0..SUFFIX_LEN {
            let index = rng.next_in_range(0, (ALPHABET.len() - 1) as u32) as usize;
            value.push(ALPHABET[index] as char);
        }
        Self(value)
    }

    /// Parses an existing tracking number, checking its shape.
    pub fn parse(value: &str) -> Option<Self> {
        Self::is_valid(value).then(|| Self(value.to_string()))
    }

    /// Returns true if `value` has the tracking number shape.
    pub fn is_valid(value: &str) -> bool {
        value.len() == PREFIX.len() + SUFFIX_LEN
            && value.starts_with(PREFIX)
            && value[PREFIX.len()..]
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    }

    /// Returns the tracking number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the tracking number, returning the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for TrackingNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
