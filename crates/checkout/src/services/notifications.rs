//! Notification channel trait, message types and implementations.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{CheckoutError, Result};

/// Queue a notification is published to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    #[serde(rename = "orders-queue")]
    Orders,
    #[serde(rename = "products-queue")]
    Products,
    #[serde(rename = "customers-queue")]
    Customers,
}

impl Topic {
    /// Returns the queue name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Orders => "orders-queue",
            Topic::Products => "products-queue",
            Topic::Customers => "customers-queue",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A structured notification. Serialized as JSON with a `type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationMessage {
    OrderPlaced {
        order_id: String,
        payment_method: String,
        total: String,
        message: String,
    },
    LowStock {
        product_id: String,
        product_name: String,
        current_stock: i64,
        threshold: i64,
        message: String,
    },
    ProductAdded {
        product_id: String,
        message: String,
    },
    CustomerRegistered {
        customer_id: String,
        message: String,
    },
}

impl NotificationMessage {
    /// Order-placed message for the orders queue.
    pub fn order_placed(
        order_id: impl std::fmt::Display,
        payment_method: impl std::fmt::Display,
        total: impl std::fmt::Display,
    ) -> Self {
        let (order_id, payment_method, total) = (
            order_id.to_string(),
            payment_method.to_string(),
            total.to_string(),
        );
        let message =
            format!("ORDER #{order_id} - Order placed with {payment_method}. Total: {total}");
        NotificationMessage::OrderPlaced {
            order_id,
            payment_method,
            total,
            message,
        }
    }

    /// Low-stock alert for the products queue.
    pub fn low_stock(
        product_id: impl std::fmt::Display,
        product_name: impl Into<String>,
        current_stock: i64,
        threshold: i64,
    ) -> Self {
        let product_id = product_id.to_string();
        let product_name = product_name.into();
        let message = format!(
            "LOW STOCK ALERT: {product_name} (ID: {product_id}) - Current: {current_stock}, Threshold: {threshold}"
        );
        NotificationMessage::LowStock {
            product_id,
            product_name,
            current_stock,
            threshold,
            message,
        }
    }

    /// New-product announcement for the products queue.
    pub fn product_added(product_id: impl std::fmt::Display, detail: impl std::fmt::Display) -> Self {
        let product_id = product_id.to_string();
        let message = format!("PRODUCT #{product_id} - New product added: {detail}");
        NotificationMessage::ProductAdded {
            product_id,
            message,
        }
    }

    /// New-customer announcement for the customers queue.
    pub fn customer_registered(
        customer_id: impl std::fmt::Display,
        name: impl std::fmt::Display,
    ) -> Self {
        let customer_id = customer_id.to_string();
        let message = format!("CUSTOMER #{customer_id} - New customer registered: {name}");
        NotificationMessage::CustomerRegistered {
            customer_id,
            message,
        }
    }

    /// Returns the human-readable message text.
    pub fn text(&self) -> &str {
        match self {
            NotificationMessage::OrderPlaced { message, .. }
            | NotificationMessage::LowStock { message, .. }
            | NotificationMessage::ProductAdded { message, .. }
            | NotificationMessage::CustomerRegistered { message, .. } => message,
        }
    }
}

/// Trait for fire-and-forget message publication.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Publishes a message to a topic.
    async fn publish(&self, topic: Topic, message: &NotificationMessage) -> Result<()>;
}

#[async_trait]
impl<T: NotificationChannel + ?Sized> NotificationChannel for Arc<T> {
    async fn publish(&self, topic: Topic, message: &NotificationMessage) -> Result<()> {
        (**self).publish(topic, message).await
    }
}

/// Publishes a message, logging and discarding any failure.
///
/// Returns whether the channel accepted the message.
pub async fn publish_best_effort<N: NotificationChannel + ?Sized>(
    channel: &N,
    topic: Topic,
    message: &NotificationMessage,
) -> bool {
    match channel.publish(topic, message).await {
        Ok(()) => true,
        Err(e) => {
            metrics::counter!("notifications_failed_total", "topic" => topic.as_str())
                .increment(1);
            tracing::warn!(topic = %topic, error = %e, "notification dropped");
            false
        }
    }
}

#[derive(Debug, Default)]
struct InMemoryChannelState {
    published: Vec<(Topic, NotificationMessage)>,
    fail_on_publish: bool,
}

/// In-memory notification channel for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationChannel {
    state: Arc<RwLock<InMemoryChannelState>>,
}

impl InMemoryNotificationChannel {
    /// Creates a new in-memory channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the channel to fail every publish while set.
    pub async fn set_fail_on_publish(&self, fail: bool) {
        self.state.write().await.fail_on_publish = fail;
    }

    /// Returns every message published so far.
    pub async fn published(&self) -> Vec<(Topic, NotificationMessage)> {
        self.state.read().await.published.clone()
    }

    /// Returns the messages published to one topic.
    pub async fn published_to(&self, topic: Topic) -> Vec<NotificationMessage> {
        self.state
            .read()
            .await
            .published
            .iter()
            .filter(|(t, _)| *t == topic)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Returns the low-stock alerts published so far.
    pub async fn low_stock_alerts(&self) -> Vec<NotificationMessage> {
        self.published_to(Topic::Products)
            .await
            .into_iter()
            .filter(|m| matches!(m, NotificationMessage::LowStock { .. }))
            .collect()
    }
}

#[async_trait]
impl NotificationChannel for InMemoryNotificationChannel {
    async fn publish(&self, topic: Topic, message: &NotificationMessage) -> Result<()> {
        let mut state = self.state.write().await;
        if state.fail_on_publish {
            return Err(CheckoutError::Notification("Queue unavailable".to_string()));
        }
        state.published.push((topic, message.clone()));
        Ok(())
    }
}

/// Channel that writes each message to the log as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotificationChannel;

#[async_trait]
impl NotificationChannel for LogNotificationChannel {
    async fn publish(&self, topic: Topic, message: &NotificationMessage) -> Result<()> {
        let body = serde_json::to_string(message)?;
        tracing::info!(topic = %topic, body = %body, "notification published");
        Ok(())
    }
}
