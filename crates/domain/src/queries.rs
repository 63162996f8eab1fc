//! Read paths for storefront listings.
//!
//! Listings never fail: any error while reading or aggregating is logged and
//! the caller gets an empty result instead.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::OrderId;
use record_store::{EntityTag, RecordStore, RecordStoreExt, Stored};
use serde::Serialize;

use crate::catalog::{CUSTOMER_PARTITION, Customer, PRODUCT_PARTITION, Product};
use crate::error::DomainError;
use crate::order::{LineItem, ORDER_PARTITION, Order};
use crate::value_objects::{CustomerId, Money};

/// Number of item names shown in a contract summary before eliding.
const SUMMARY_ITEMS: usize = 3;

/// An order row in the order index.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub order: Order,
    /// Customer name, `Customer ID: <id>` when the customer is gone, or
    /// `None` when the order has no customer yet.
    pub customer_name: Option<String>,
}

/// Everything shown on an order's detail and confirmation views.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    pub order: Order,
    pub etag: EntityTag,
    pub items: Vec<LineItem>,
    pub customer: Option<Customer>,
}

/// One credit contract on file, joined with its order and customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractSummary {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub customer_email: String,
    pub order_id: OrderId,
    pub order_total: Money,
    pub order_date: DateTime<Utc>,
    pub file_name: String,
    pub items_summary: String,
    pub item_count: usize,
}

/// Soft-fail read queries over orders, products and customers.
pub struct StorefrontQueries<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> StorefrontQueries<S> {
    /// Creates a new query service over the given record store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All orders with resolved customer names.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self) -> Vec<OrderSummary> {
        soft_fail("list_orders", self.try_list_orders().await)
    }

    /// Orders placed by one customer.
    #[tracing::instrument(skip(self))]
    pub async fn orders_for_customer(&self, customer_id: &CustomerId) -> Vec<Order> {
        let result = self.orders().await.map(|orders| {
            orders
                .into_iter()
                .filter(|o| o.customer_id.as_ref() == Some(customer_id))
                .collect()
        });
        soft_fail("orders_for_customer", result)
    }

    /// All products.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self) -> Vec<Product> {
        soft_fail("list_products", self.all(PRODUCT_PARTITION).await)
    }

    /// Products in one category (exact match).
    #[tracing::instrument(skip(self))]
    pub async fn products_in_category(&self, category: &str) -> Vec<Product> {
        let result = self.all::<Product>(PRODUCT_PARTITION).await.map(|products| {
            products
                .into_iter()
                .filter(|p| p.category == category)
                .collect()
        });
        soft_fail("products_in_category", result)
    }

    /// All customers.
    #[tracing::instrument(skip(self))]
    pub async fn list_customers(&self) -> Vec<Customer> {
        soft_fail("list_customers", self.all(CUSTOMER_PARTITION).await)
    }

    /// One order with its items and customer. `None` if absent or unreadable.
    #[tracing::instrument(skip(self))]
    pub async fn order_details(&self, order_id: &OrderId) -> Option<OrderDetails> {
        soft_fail("order_details", self.try_order_details(order_id).await)
    }

    /// Orders carrying both a contract and a customer, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_contracts(&self) -> Vec<ContractSummary> {
        soft_fail("list_contracts", self.try_list_contracts().await)
    }

    async fn all<E: record_store::Entity>(&self, partition: &str) -> Result<Vec<E>, DomainError> {
        Ok(self
            .store
            .load_all::<E>(partition)
            .await?
            .into_iter()
            .map(Stored::into_inner)
            .collect())
    }

    async fn orders(&self) -> Result<Vec<Order>, DomainError> {
        self.all(ORDER_PARTITION).await
    }

    async fn customer(&self, id: &CustomerId) -> Result<Option<Customer>, DomainError> {
        Ok(self
            .store
            .load::<Customer>(CUSTOMER_PARTITION, id.as_str())
            .await?
            .map(Stored::into_inner))
    }

    async fn try_list_orders(&self) -> Result<Vec<OrderSummary>, DomainError> {
        let orders = self.orders().await?;
        let mut names: HashMap<CustomerId, String> = HashMap::new();

        for order in &orders {
            let Some(customer_id) = &order.customer_id else {
                continue;
            };
            if names.contains_key(customer_id) {
                continue;
            }
            let name = match self.customer(customer_id).await? {
                Some(customer) => customer.name,
                None => format!("Customer ID: {customer_id}"),
            };
            names.insert(customer_id.clone(), name);
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let customer_name = order
                    .customer_id
                    .as_ref()
                    .and_then(|id| names.get(id).cloned());
                OrderSummary {
                    order,
                    customer_name,
                }
            })
            .collect())
    }

    async fn try_order_details(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<OrderDetails>, DomainError> {
        let Some(Stored { entity: order, etag }) = self
            .store
            .load::<Order>(ORDER_PARTITION, order_id.as_str())
            .await?
        else {
            return Ok(None);
        };

        let items = self.all::<LineItem>(&LineItem::partition_for(order_id)).await?;
        let customer = match &order.customer_id {
            Some(id) => self.customer(id).await?,
            None => None,
        };

        Ok(Some(OrderDetails {
            order,
            etag,
            items,
            customer,
        }))
    }

    async fn try_list_contracts(&self) -> Result<Vec<ContractSummary>, DomainError> {
        let mut contracts = Vec::new();

        for order in self.orders().await? {
            let (Some(customer_id), Some(file_name)) =
                (order.customer_id.clone(), order.contract_file.clone())
            else {
                continue;
            };
            if file_name.is_empty() {
                continue;
            }

            let customer = self.customer(&customer_id).await?;
            let items = self.all::<LineItem>(&LineItem::partition_for(&order.id)).await?;

            contracts.push(ContractSummary {
                customer_name: customer
                    .as_ref()
                    .map_or_else(|| "Unknown Customer".to_string(), |c| c.name.clone()),
                customer_email: customer.map(|c| c.email).unwrap_or_default(),
                customer_id,
                order_id: order.id,
                order_total: order.total,
                order_date: order.order_date,
                file_name,
                items_summary: summarize_items(&items),
                item_count: items.len(),
            });
        }

        contracts.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        Ok(contracts)
    }
}

fn summarize_items(items: &[LineItem]) -> String {
    let mut summary = items
        .iter()
        .take(SUMMARY_ITEMS)
        .map(|i| i.product_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    if items.len() > SUMMARY_ITEMS {
        summary.push_str("...");
    }
    summary
}

fn soft_fail<T: Default>(operation: &'static str, result: Result<T, DomainError>) -> T {
    result.unwrap_or_else(|error| {
        tracing::warn!(operation, error = %error, "read failed, returning empty result");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::PaymentMethod;
    use crate::value_objects::ProductId;
    use record_store::InMemoryRecordStore;

    fn item(order_id: &OrderId, name: &str) -> LineItem {
        LineItem::new(
            order_id.clone(),
            ProductId::new(name),
            name,
            1,
            Money::from_cents(100),
        )
    }

    #[tokio::test]
    async fn unavailable_store_degrades_to_empty() {
        let store = InMemoryRecordStore::new();
        store.set_unavailable(true).await;
        let queries = StorefrontQueries::new(store);

        assert!(queries.list_orders().await.is_empty());
        assert!(queries.list_products().await.is_empty());
        assert!(queries.list_contracts().await.is_empty());
        assert!(queries.order_details(&OrderId::new()).await.is_none());
    }

    #[tokio::test]
    async fn order_index_falls_back_to_customer_id() {
        let store = InMemoryRecordStore::new();
        let known = Customer::new("Lerato", "lerato@example.com");
        store.save(&known).await.unwrap();

        let mut a = Order::new_cart(OrderId::from_string("AAAA0001"), Utc::now());
        a.customer_id = Some(known.id.clone());
        let mut b = Order::new_cart(OrderId::from_string("BBBB0002"), Utc::now());
        b.customer_id = Some(CustomerId::new("deleted"));
        let c = Order::new_cart(OrderId::from_string("CCCC0003"), Utc::now());
        for order in [&a, &b, &c] {
            store.save(order).await.unwrap();
        }

        let summaries = StorefrontQueries::new(store).list_orders().await;
        let names: Vec<_> = summaries.iter().map(|s| s.customer_name.clone()).collect();
        assert_eq!(
            names,
            vec![
                Some("Lerato".to_string()),
                Some("Customer ID: deleted".to_string()),
                None
            ]
        );
    }

    #[tokio::test]
    async fn contracts_summarize_items_newest_first() {
        let store = InMemoryRecordStore::new();
        let customer = Customer::new("Sipho", "sipho@example.com");
        store.save(&customer).await.unwrap();

        let older_id = OrderId::from_string("OLD00001");
        let mut older = Order::new_cart(older_id.clone(), Utc::now() - chrono::Duration::days(3));
        older.customer_id = Some(customer.id.clone());
        older.payment_method = Some(PaymentMethod::Credit);
        older.contract_file = Some("OLD00001-contract.pdf".to_string());
        store.save(&older).await.unwrap();
        for name in ["A", "B", "C", "D"] {
            store.save(&item(&older_id, name)).await.unwrap();
        }

        let newer_id = OrderId::from_string("NEW00002");
        let mut newer = Order::new_cart(newer_id.clone(), Utc::now());
        newer.customer_id = Some(CustomerId::new("gone"));
        newer.contract_file = Some("NEW00002-contract.png".to_string());
        store.save(&newer).await.unwrap();
        store.save(&item(&newer_id, "Z")).await.unwrap();

        // No contract: excluded.
        let mut plain = Order::new_cart(OrderId::from_string("PLN00003"), Utc::now());
        plain.customer_id = Some(customer.id.clone());
        store.save(&plain).await.unwrap();

        let contracts = StorefrontQueries::new(store).list_contracts().await;
        assert_eq!(contracts.len(), 2);

        assert_eq!(contracts[0].order_id, newer_id);
        assert_eq!(contracts[0].customer_name, "Unknown Customer");
        assert_eq!(contracts[0].items_summary, "Z");

        assert_eq!(contracts[1].customer_email, "sipho@example.com");
        assert_eq!(contracts[1].items_summary, "A, B, C...");
        assert_eq!(contracts[1].item_count, 4);
    }

    #[tokio::test]
    async fn category_filter_and_customer_orders() {
        let store = InMemoryRecordStore::new();
        store
            .save(&Product::new("Toner", 1, 0, 1).with_category("Skin"))
            .await
            .unwrap();
        store
            .save(&Product::new("Shampoo", 1, 0, 1).with_category("Hair"))
            .await
            .unwrap();

        let customer_id = CustomerId::new("c1");
        let mut order = Order::new_cart(OrderId::new(), Utc::now());
        order.customer_id = Some(customer_id.clone());
        store.save(&order).await.unwrap();

        let queries = StorefrontQueries::new(store);
        let skin = queries.products_in_category("Skin").await;
        assert_eq!(skin.len(), 1);
        assert_eq!(skin[0].name, "Toner");
        assert_eq!(queries.orders_for_customer(&customer_id).await.len(), 1);
        assert!(queries
            .orders_for_customer(&CustomerId::new("other"))
            .await
            .is_empty());
    }
}
