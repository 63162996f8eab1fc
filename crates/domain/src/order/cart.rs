//! Cart assembly on top of the order record.

use chrono::Utc;
use common::OrderId;
use record_store::{EntityTag, RecordStore, RecordStoreError, RecordStoreExt, Stored};

use super::{LineItem, ORDER_PARTITION, Order, PaymentMethod};
use crate::catalog::{PRODUCT_PARTITION, Product};
use crate::error::DomainError;
use crate::pricing::calculate_totals;
use crate::value_objects::{CustomerId, ProductId};

/// The caller's binding to its in-progress cart.
///
/// Holds at most one order ID. It is passed explicitly to every cart
/// operation and checkout; whoever owns it decides how long it lives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartHandle {
    order_id: Option<OrderId>,
}

impl CartHandle {
    /// Creates an unbound handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a handle already bound to an order.
    pub fn bound(order_id: OrderId) -> Self {
        Self {
            order_id: Some(order_id),
        }
    }

    /// Returns the bound order ID, if any.
    pub fn order_id(&self) -> Option<&OrderId> {
        self.order_id.as_ref()
    }

    /// Returns true if a cart is bound.
    pub fn is_bound(&self) -> bool {
        self.order_id.is_some()
    }

    /// Binds the handle to an order.
    pub fn bind(&mut self, order_id: OrderId) {
        self.order_id = Some(order_id);
    }

    /// Drops the binding.
    pub fn clear(&mut self) {
        self.order_id = None;
    }
}

/// Order aggregate manager: builds carts line by line and keeps their totals
/// current.
///
/// Every write to an existing record is a compare-and-swap against the tag
/// read immediately before it. Conflicts are returned, never retried.
pub struct CartService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> CartService<S> {
    /// Creates a new cart service over the given record store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying record store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the cart bound to `handle`, or opens a new one and binds it.
    ///
    /// If the bound order has disappeared the handle is cleared and
    /// `OrderNotFound` is returned so the caller can start over.
    #[tracing::instrument(skip(self))]
    pub async fn start_or_continue(
        &self,
        handle: &mut CartHandle,
    ) -> Result<Stored<Order>, DomainError> {
        if let Some(order_id) = handle.order_id().cloned() {
            return match self.get_order(&order_id).await? {
                Some(stored) => Ok(stored),
                None => {
                    tracing::warn!(order_id = %order_id, "bound cart no longer exists");
                    handle.clear();
                    Err(DomainError::OrderNotFound(order_id))
                }
            };
        }

        let order = Order::new_cart(OrderId::new(), Utc::now());
        let etag = self.store.save(&order).await?;
        handle.bind(order.id.clone());

        metrics::counter!("carts_opened_total").increment(1);
        tracing::info!(order_id = %order.id, "cart opened");

        Ok(Stored {
            entity: order,
            etag,
        })
    }

    /// Adds `quantity` units of a product to the handle's cart.
    ///
    /// Repeated additions of one product accumulate on a single line item
    /// that keeps the price captured the first time.
    #[tracing::instrument(skip(self))]
    pub async fn add_product(
        &self,
        handle: &mut CartHandle,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Order, DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity { quantity });
        }

        let cart = self.start_or_continue(handle).await?;
        let order_id = cart.entity.id;

        let product = self
            .store
            .load::<Product>(PRODUCT_PARTITION, product_id.as_str())
            .await?
            .ok_or_else(|| DomainError::ProductNotFound(product_id.clone()))?
            .into_inner();

        match self
            .store
            .load::<LineItem>(&LineItem::partition_for(&order_id), product_id.as_str())
            .await?
        {
            Some(Stored {
                entity: mut item,
                etag,
            }) => {
                item.quantity = item
                    .quantity
                    .checked_add(quantity)
                    .ok_or(DomainError::InvalidQuantity { quantity })?;
                self.ensure_priceable(&item).await?;
                self.store.save_if_match(&item, etag).await?;
            }
            None => {
                let item = LineItem::new(
                    order_id.clone(),
                    product.id.clone(),
                    product.name.clone(),
                    quantity,
                    product.unit_price(),
                );
                self.ensure_priceable(&item).await?;
                self.store.save(&item).await?;
            }
        }

        metrics::counter!("cart_mutations_total", "operation" => "add").increment(1);
        tracing::info!(order_id = %order_id, product_id = %product_id, quantity, "product added to cart");

        self.recalculate_totals(&order_id).await
    }

    /// Sets the quantity of a line item. Anything below 1 removes it.
    ///
    /// A missing line item leaves the order untouched.
    #[tracing::instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        order_id: &OrderId,
        product_id: &ProductId,
        new_quantity: u32,
    ) -> Result<Order, DomainError> {
        if new_quantity < 1 {
            return self.remove_item(order_id, product_id).await;
        }

        let Some(Stored {
            entity: mut item,
            etag,
        }) = self
            .store
            .load::<LineItem>(&LineItem::partition_for(order_id), product_id.as_str())
            .await?
        else {
            return self.require_order(order_id).await.map(Stored::into_inner);
        };

        item.quantity = new_quantity;
        self.ensure_priceable(&item).await?;
        self.store.save_if_match(&item, etag).await?;

        metrics::counter!("cart_mutations_total", "operation" => "update").increment(1);
        self.recalculate_totals(order_id).await
    }

    /// Removes a line item. Removing an absent item is not an error.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(
        &self,
        order_id: &OrderId,
        product_id: &ProductId,
    ) -> Result<Order, DomainError> {
        let removed = self
            .store
            .delete(&LineItem::partition_for(order_id), product_id.as_str())
            .await?;

        if removed {
            metrics::counter!("cart_mutations_total", "operation" => "remove").increment(1);
        }
        self.recalculate_totals(order_id).await
    }

    /// Deletes an order and all of its line items.
    ///
    /// Items go first. If deleting the order record then fails the items
    /// stay deleted. Returns whether the order record existed.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, order_id: &OrderId) -> Result<bool, DomainError> {
        let items = self
            .store
            .query_all(&LineItem::partition_for(order_id))
            .await?;
        for item in &items {
            self.store
                .delete(&item.key.partition, &item.key.row)
                .await?;
        }

        let existed = self.store.delete(ORDER_PARTITION, order_id.as_str()).await?;
        tracing::info!(order_id = %order_id, items = items.len(), existed, "order deleted");
        Ok(existed)
    }

    /// Loads an order with its tag.
    pub async fn get_order(&self, order_id: &OrderId) -> Result<Option<Stored<Order>>, DomainError> {
        Ok(self.store.load(ORDER_PARTITION, order_id.as_str()).await?)
    }

    /// Loads an order together with its line items.
    pub async fn get_cart(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<(Order, Vec<LineItem>)>, DomainError> {
        match self.get_order(order_id).await? {
            Some(stored) => {
                let items = self.line_items(order_id).await?;
                Ok(Some((stored.entity, items)))
            }
            None => Ok(None),
        }
    }

    /// Returns the line items of an order, ordered by product ID.
    pub async fn line_items(&self, order_id: &OrderId) -> Result<Vec<LineItem>, DomainError> {
        Ok(self
            .store
            .load_all::<LineItem>(&LineItem::partition_for(order_id))
            .await?
            .into_iter()
            .map(Stored::into_inner)
            .collect())
    }

    /// Recomputes the order's totals from its current line items and writes
    /// them back.
    #[tracing::instrument(skip(self))]
    pub async fn recalculate_totals(&self, order_id: &OrderId) -> Result<Order, DomainError> {
        let Stored {
            entity: mut order,
            etag,
        } = self.require_order(order_id).await?;

        let items = self.line_items(order_id).await?;
        let totals = calculate_totals(&items)
            .ok_or_else(|| DomainError::AmountOverflow(order_id.clone()))?;
        order.apply_totals(&totals);

        self.store.save_if_match(&order, etag).await?;
        tracing::debug!(order_id = %order_id, total = %order.total, "totals recalculated");
        Ok(order)
    }

    /// Sets the customer and payment method of an order outside checkout.
    ///
    /// With `if_match` the write only succeeds against that revision;
    /// otherwise against the revision read here.
    #[tracing::instrument(skip(self))]
    pub async fn edit_order(
        &self,
        order_id: &OrderId,
        customer_id: Option<CustomerId>,
        payment_method: Option<PaymentMethod>,
        if_match: Option<EntityTag>,
    ) -> Result<Stored<Order>, DomainError> {
        let Stored {
            entity: mut order,
            etag,
        } = self.require_order(order_id).await?;

        order.customer_id = customer_id;
        order.payment_method = payment_method;

        let etag = self
            .store
            .save_if_match(&order, if_match.unwrap_or(etag))
            .await
            .map_err(|e| match e {
                RecordStoreError::NotFound(_) => DomainError::OrderNotFound(order_id.clone()),
                other => other.into(),
            })?;

        Ok(Stored {
            entity: order,
            etag,
        })
    }

    /// Rejects a line-item write that would leave the order unpriceable.
    async fn ensure_priceable(&self, candidate: &LineItem) -> Result<(), DomainError> {
        let mut items = self.line_items(&candidate.order_id).await?;
        items.retain(|i| i.product_id != candidate.product_id);
        items.push(candidate.clone());

        match calculate_totals(&items) {
            Some(_) => Ok(()),
            None => Err(DomainError::InvalidQuantity {
                quantity: candidate.quantity,
            }),
        }
    }

    async fn require_order(&self, order_id: &OrderId) -> Result<Stored<Order>, DomainError> {
        self.get_order(order_id)
            .await?
            .ok_or_else(|| DomainError::OrderNotFound(order_id.clone()))
    }
}
