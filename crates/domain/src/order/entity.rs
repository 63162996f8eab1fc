//! Order and line-item records.

use chrono::{DateTime, NaiveDate, Utc};
use common::OrderId;
use record_store::Entity;
use serde::{Deserialize, Serialize};

use super::{CheckoutState, PaymentMethod};
use crate::pricing::{SHIPPING_FEE, Totals};
use crate::value_objects::{CustomerId, Money, ProductId};

/// Partition holding every order record.
pub const ORDER_PARTITION: &str = "ORDER";

/// Prefix of the per-order partitions holding line items.
pub const LINE_ITEM_PARTITION_PREFIX: &str = "ORDERITEMS:";

/// The order aggregate root. Before checkout it doubles as the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: Option<CustomerId>,
    pub order_date: DateTime<Utc>,
    /// Fee recorded when the cart was opened. Pricing uses the constant fee.
    pub shipping_fee: Money,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub payment_method: Option<PaymentMethod>,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<NaiveDate>,
    pub contract_file: Option<String>,
}

impl Order {
    /// Opens an empty cart. The total starts at the shipping fee.
    pub fn new_cart(id: OrderId, order_date: DateTime<Utc>) -> Self {
        let totals = Totals::empty();
        Self {
            id,
            customer_id: None,
            order_date,
            shipping_fee: SHIPPING_FEE,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            payment_method: None,
            tracking_number: None,
            estimated_delivery: None,
            contract_file: None,
        }
    }

    /// Overwrites the stored totals with freshly computed ones.
    pub fn apply_totals(&mut self, totals: &Totals) {
        self.subtotal = totals.subtotal;
        self.tax = totals.tax;
        self.total = totals.total;
    }

    /// Where the order sits in checkout, inferred from its fields.
    pub fn state(&self) -> CheckoutState {
        CheckoutState::of(self)
    }

    /// Human-readable delivery line for confirmation views.
    pub fn delivery_message(&self) -> String {
        match self.estimated_delivery {
            Some(date) => format!("Estimated delivery: {}", date.format("%B %-d, %Y")),
            None => "Processing delivery estimate".to_string(),
        }
    }
}

impl Entity for Order {
    fn partition_key(&self) -> String {
        ORDER_PARTITION.to_string()
    }

    fn row_key(&self) -> String {
        self.id.to_string()
    }
}

/// One product line under an order.
///
/// Stored in a partition of its own per order (see [`LineItem::partition_for`]),
/// keyed by product, so there is at most one line per product per order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    /// Price captured when the product was first added.
    pub unit_price: Money,
}

impl LineItem {
    /// Creates a new line item.
    pub fn new(
        order_id: OrderId,
        product_id: ProductId,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            order_id,
            product_id,
            product_name: product_name.into(),
            quantity,
            unit_price,
        }
    }

    /// Partition holding the line items of `order_id`.
    pub fn partition_for(order_id: &OrderId) -> String {
        format!("{LINE_ITEM_PARTITION_PREFIX}{order_id}")
    }

    /// Returns quantity times unit price, or `None` if it overflows.
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_multiply(self.quantity)
    }
}

impl Entity for LineItem {
    fn partition_key(&self) -> String {
        Self::partition_for(&self.order_id)
    }

    fn row_key(&self) -> String {
        self.product_id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cart_totals() {
        let order = Order::new_cart(OrderId::new(), Utc::now());
        assert!(order.subtotal.is_zero());
        assert_eq!(order.total, order.shipping_fee);
        assert_eq!(order.state(), CheckoutState::Cart);
    }

    #[test]
    fn line_items_live_in_a_namespaced_order_partition() {
        let item = LineItem::new(
            OrderId::from_string("AB12CD34"),
            ProductId::new("p-1"),
            "Serum",
            2,
            Money::from_cents(1999),
        );
        let key = item.record_key();
        assert_eq!(key.partition, "ORDERITEMS:AB12CD34");
        assert_eq!(key.row, "p-1");
        assert_eq!(item.line_total(), Some(Money::from_cents(3998)));

        let clash = LineItem::partition_for(&OrderId::from_string(ORDER_PARTITION));
        assert_ne!(clash, ORDER_PARTITION);
    }

    #[test]
    fn delivery_message() {
        let mut order = Order::new_cart(OrderId::new(), Utc::now());
        assert_eq!(order.delivery_message(), "Processing delivery estimate");

        order.estimated_delivery = NaiveDate::from_ymd_opt(2025, 3, 4);
        assert_eq!(order.delivery_message(), "Estimated delivery: March 4, 2025");
    }
}
