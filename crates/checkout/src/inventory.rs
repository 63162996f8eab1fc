//! Stock decrements and low-stock signalling.

use domain::catalog::PRODUCT_PARTITION;
use domain::{LineItem, Product, ProductId};
use record_store::{RecordStore, RecordStoreExt, Stored};

use crate::error::Result;
use crate::services::notifications::{
    NotificationChannel, NotificationMessage, Topic, publish_best_effort,
};

/// Outcome of applying an order's line items to stock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryReport {
    /// Products whose stock was decremented, in line-item order.
    pub decremented: Vec<ProductId>,
    /// Products that fired a low-stock signal.
    pub low_stock: Vec<ProductId>,
}

/// Applies sold quantities to product stock and raises low-stock signals.
pub struct InventoryDispatcher<S: RecordStore, N: NotificationChannel> {
    store: S,
    notifications: N,
}

impl<S: RecordStore, N: NotificationChannel> InventoryDispatcher<S, N> {
    /// Creates a new dispatcher.
    pub fn new(store: S, notifications: N) -> Self {
        Self {
            store,
            notifications,
        }
    }

    /// Returns the notification channel.
    pub fn notifications(&self) -> &N {
        &self.notifications
    }

    /// Subtracts `quantity` from a product's stock. Stock may go negative.
    #[tracing::instrument(skip(self))]
    pub async fn decrement_stock(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        let Some(Stored {
            entity: mut product,
            etag,
        }) = self
            .store
            .load::<Product>(PRODUCT_PARTITION, product_id.as_str())
            .await?
        else {
            return Err(domain::DomainError::ProductNotFound(product_id.clone()).into());
        };

        product.stock_quantity -= i64::from(quantity);
        self.store.save_if_match(&product, etag).await?;

        tracing::info!(product_id = %product_id, quantity, stock = product.stock_quantity, "stock decremented");
        Ok(())
    }

    /// Emits a low-stock signal if the product is at or below its threshold.
    ///
    /// Returns whether a signal was emitted. Publication failures are
    /// swallowed.
    pub async fn check_low_stock(&self, product: &Product) -> bool {
        if !product.is_low_stock() {
            return false;
        }

        metrics::counter!("low_stock_alerts_total").increment(1);
        tracing::warn!(
            product_id = %product.id,
            stock = product.stock_quantity,
            threshold = product.low_stock_threshold,
            "low stock"
        );

        let message = NotificationMessage::low_stock(
            &product.id,
            product.name.clone(),
            product.stock_quantity,
            product.low_stock_threshold,
        );
        publish_best_effort(&self.notifications, Topic::Products, &message).await;
        true
    }

    /// Decrements stock for every line item, re-reading each product and
    /// checking its threshold after the decrement.
    ///
    /// Stops at the first failure; earlier decrements stay applied.
    #[tracing::instrument(skip(self, items), fields(items = items.len()))]
    pub async fn apply_order(&self, items: &[LineItem]) -> Result<InventoryReport> {
        let mut report = InventoryReport::default();

        for item in items {
            self.decrement_stock(&item.product_id, item.quantity).await?;
            report.decremented.push(item.product_id.clone());

            let product = self
                .store
                .load::<Product>(PRODUCT_PARTITION, item.product_id.as_str())
                .await?;
            if let Some(stored) = product {
                if self.check_low_stock(&stored.entity).await {
                    report.low_stock.push(item.product_id.clone());
                }
            }
        }

        Ok(report)
    }
}
