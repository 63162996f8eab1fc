//! Checkout coordinator: turns a cart into a placed order.

use std::sync::Arc;
use std::time::Instant;

use common::OrderId;
use domain::{CartHandle, CartService, CustomerId, LineItem, Order, PaymentMethod};
use record_store::{RecordStore, RecordStoreExt, Stored};
use serde::Serialize;

use crate::delivery::estimate_delivery;
use crate::document::{ContractDocument, contract_directory, contract_file_name};
use crate::error::{CheckoutError, Result};
use crate::inventory::InventoryDispatcher;
use crate::random::RandomSource;
use crate::services::documents::DocumentStore;
use crate::services::notifications::{
    NotificationChannel, NotificationMessage, Topic, publish_best_effort,
};
use crate::tracking::TrackingNumber;

/// Everything the customer submits to complete an order.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub payment_method: PaymentMethod,
    /// Required when paying on credit.
    pub contract: Option<ContractDocument>,
}

/// A completed order as shown on the confirmation view.
#[derive(Debug, Clone, Serialize)]
pub struct OrderConfirmation {
    pub order: Order,
    pub items: Vec<LineItem>,
}

/// Drives an order from cart to completed.
///
/// Steps, in order: bind the customer, collect the credit contract, set the
/// payment method, apply inventory, assign tracking and delivery, persist,
/// release the cart handle, announce the order. Validation failures stop
/// the flow with earlier writes kept. Inventory and notification failures
/// are logged and never stop it.
pub struct CheckoutCoordinator<S, D, N>
where
    S: RecordStore,
    D: DocumentStore,
    N: NotificationChannel,
{
    store: S,
    carts: CartService<S>,
    documents: D,
    inventory: InventoryDispatcher<S, N>,
    random: Arc<dyn RandomSource>,
}

impl<S, D, N> CheckoutCoordinator<S, D, N>
where
    S: RecordStore + Clone,
    D: DocumentStore,
    N: NotificationChannel,
{
    /// Creates a new checkout coordinator.
    pub fn new(store: S, documents: D, notifications: N, random: Arc<dyn RandomSource>) -> Self {
        Self {
            carts: CartService::new(store.clone()),
            inventory: InventoryDispatcher::new(store.clone(), notifications),
            store,
            documents,
            random,
        }
    }

    /// Returns the inventory dispatcher.
    pub fn inventory(&self) -> &InventoryDispatcher<S, N> {
        &self.inventory
    }

    /// Completes checkout for an order.
    ///
    /// On success the order carries a tracking number and delivery estimate
    /// and `handle` is cleared. On a validation failure the order stays
    /// editable, though the customer binding has already been written.
    #[tracing::instrument(
        skip(self, handle, request),
        fields(order_id = %request.order_id, payment_method = %request.payment_method)
    )]
    pub async fn complete_order(
        &self,
        handle: &mut CartHandle,
        request: CheckoutRequest,
    ) -> Result<OrderConfirmation> {
        let started = Instant::now();
        let result = self.run(handle, request).await;

        match &result {
            Ok(confirmation) => {
                metrics::counter!("checkout_completed_total").increment(1);
                metrics::histogram!("checkout_duration_seconds")
                    .record(started.elapsed().as_secs_f64());
                tracing::info!(
                    tracking_number = confirmation.order.tracking_number.as_deref().unwrap_or_default(),
                    total = %confirmation.order.total,
                    "checkout completed"
                );
            }
            Err(e) => {
                let reason = if e.is_validation() {
                    "validation"
                } else if e.is_not_found() {
                    "not_found"
                } else if e.is_conflict() {
                    "conflict"
                } else {
                    "error"
                };
                metrics::counter!("checkout_rejected_total", "reason" => reason).increment(1);
                tracing::warn!(error = %e, reason, "checkout rejected");
            }
        }

        result
    }

    async fn run(
        &self,
        handle: &mut CartHandle,
        request: CheckoutRequest,
    ) -> Result<OrderConfirmation> {
        let CheckoutRequest {
            order_id,
            customer_id,
            payment_method,
            contract,
        } = request;

        // 1. Load
        let Stored {
            entity: mut order,
            etag,
        } = self
            .carts
            .get_order(&order_id)
            .await?
            .ok_or_else(|| CheckoutError::OrderNotFound(order_id.clone()))?;

        if order.state().is_completed() {
            tracing::warn!("order already completed, checking out again");
        }

        // 2. Bind customer. Kept even if a later step rejects.
        order.customer_id = Some(customer_id.clone());
        let mut etag = self.store.save_if_match(&order, etag).await?;

        // 3. Contract for credit
        if payment_method.requires_contract() {
            let document = contract
                .filter(|d| !d.is_empty())
                .ok_or(CheckoutError::ContractRequired)?;
            let extension = document.validate()?;

            let stored_name = self
                .documents
                .upload(
                    &contract_directory(&customer_id),
                    &contract_file_name(&order_id, &extension),
                    document.content,
                )
                .await
                .map_err(|e| CheckoutError::UploadFailed(e.to_string()))?;

            tracing::info!(file = %stored_name, "contract stored");
            order.contract_file = Some(stored_name);
        }

        // 4. Payment method
        order.payment_method = Some(payment_method);

        // 5. Inventory. Failures are swallowed.
        let items = self.apply_inventory(&order_id).await;

        // 6. Tracking and delivery
        let tracking = TrackingNumber::generate(self.random.as_ref());
        order.estimated_delivery = Some(estimate_delivery(
            order.order_date.date_naive(),
            self.random.as_ref(),
        ));
        order.tracking_number = Some(tracking.into_inner());

        // 7. Persist and release the cart
        etag = self.store.save_if_match(&order, etag).await?;
        handle.clear();
        tracing::debug!(etag = %etag, "order finalized");

        // 8. Announce
        let message = NotificationMessage::order_placed(&order.id, payment_method, order.total);
        publish_best_effort(self.inventory.notifications(), Topic::Orders, &message).await;

        // 9. Completed
        Ok(OrderConfirmation { order, items })
    }

    /// Decrements stock for the order's line items and returns them. Nothing
    /// here can fail the checkout: an unreadable item set is treated as empty.
    async fn apply_inventory(&self, order_id: &OrderId) -> Vec<LineItem> {
        let items = match self.carts.line_items(order_id).await {
            Ok(items) => items,
            Err(e) => {
                metrics::counter!("inventory_failures_total").increment(1);
                tracing::warn!(error = %e, "line items unavailable, skipping inventory");
                return Vec::new();
            }
        };

        if let Err(e) = self.inventory.apply_order(&items).await {
            metrics::counter!("inventory_failures_total").increment(1);
            tracing::warn!(error = %e, "inventory update failed, completing order anyway");
        }
        items
    }
}
