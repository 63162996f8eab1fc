use record_store::Entity;
use serde::{Deserialize, Serialize};

use crate::value_objects::CustomerId;

/// Partition holding every customer record.
pub const CUSTOMER_PARTITION: &str = "CUSTOMER";

/// A storefront customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub shipping_address: String,
}

impl Customer {
    /// Creates a customer with a generated ID.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: CustomerId::generate(),
            name: name.into(),
            email: email.into(),
            phone: String::new(),
            shipping_address: String::new(),
        }
    }

    /// Sets the ID.
    pub fn with_id(mut self, id: impl Into<CustomerId>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the shipping address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.shipping_address = address.into();
        self
    }
}

impl Entity for Customer {
    fn partition_key(&self) -> String {
        CUSTOMER_PARTITION.to_string()
    }

    fn row_key(&self) -> String {
        self.id.to_string()
    }
}
