use record_store::Entity;
use serde::{Deserialize, Serialize};

use crate::value_objects::{Money, ProductId};

/// Partition holding every product record.
pub const PRODUCT_PARTITION: &str = "PRODUCT";

/// Stock level at or below which a low-stock signal fires, unless overridden.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Whole rand part of the price.
    pub price_rand: i64,
    /// Cents part of the price.
    pub price_cents: i64,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub key_ingredients: String,
    /// May go negative; checkout does not floor it.
    pub stock_quantity: i64,
    #[serde(default = "default_threshold")]
    pub low_stock_threshold: i64,
    #[serde(default)]
    pub image_url: String,
}

fn default_threshold() -> i64 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

impl Product {
    /// Creates a product with a generated ID and the default threshold.
    pub fn new(name: impl Into<String>, price_rand: i64, price_cents: i64, stock: i64) -> Self {
        Self {
            id: ProductId::generate(),
            name: name.into(),
            brand: String::new(),
            description: String::new(),
            category: String::new(),
            price_rand,
            price_cents,
            size: String::new(),
            key_ingredients: String::new(),
            stock_quantity: stock,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            image_url: String::new(),
        }
    }

    /// Sets the ID.
    pub fn with_id(mut self, id: impl Into<ProductId>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the low-stock threshold.
    pub fn with_threshold(mut self, threshold: i64) -> Self {
        self.low_stock_threshold = threshold;
        self
    }

    /// Unit price assembled from the two price components.
    pub fn unit_price(&self) -> Money {
        Money::from_parts(self.price_rand, self.price_cents)
    }

    /// Returns true if stock is at or below the threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.low_stock_threshold
    }
}

impl Entity for Product {
    fn partition_key(&self) -> String {
        PRODUCT_PARTITION.to_string()
    }

    fn row_key(&self) -> String {
        self.id.to_string()
    }
}
