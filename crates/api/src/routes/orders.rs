//! Order index, detail, edit and delete endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::OrderId;
use domain::{Customer, CustomerId, LineItem, Order, PaymentMethod};
use record_store::EntityTag;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct EditOrderRequest {
    pub customer_id: Option<String>,
    pub payment_method: Option<String>,
    /// Revision the edit was based on. Without it the latest revision is
    /// overwritten.
    pub etag: Option<EntityTag>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub state: String,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            state: order.state().to_string(),
            order,
        }
    }
}

#[derive(Serialize)]
pub struct OrderListEntry {
    #[serde(flatten)]
    pub order: OrderView,
    pub customer_name: Option<String>,
}

#[derive(Serialize)]
pub struct OrderDetailsResponse {
    #[serde(flatten)]
    pub order: OrderView,
    pub etag: EntityTag,
    pub items: Vec<LineItem>,
    pub customer: Option<Customer>,
}

#[derive(Serialize)]
pub struct ConfirmationResponse {
    #[serde(flatten)]
    pub order: OrderView,
    pub items: Vec<LineItem>,
    pub customer: Option<Customer>,
    pub delivery_message: String,
}

// -- Handlers --

/// GET /orders — every order with its customer's display name.
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<OrderListEntry>> {
    let orders = state
        .queries
        .list_orders()
        .await
        .into_iter()
        .map(|summary| OrderListEntry {
            order: summary.order.into(),
            customer_name: summary.customer_name,
        })
        .collect();
    Json(orders)
}

/// GET /orders/{id} — one order with its line items and customer.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderDetailsResponse>, ApiError> {
    let details = state
        .queries
        .order_details(&parse_order_id(&id)?)
        .await
        .ok_or_else(|| ApiError::order_not_found(&id))?;

    Ok(Json(OrderDetailsResponse {
        order: details.order.into(),
        etag: details.etag,
        items: details.items,
        customer: details.customer,
    }))
}

/// PUT /orders/{id} — set the customer and payment method outside checkout.
#[tracing::instrument(skip(state, req))]
pub async fn edit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<EditOrderRequest>,
) -> Result<Json<OrderDetailsResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let customer_id = non_blank(req.customer_id).map(CustomerId::new);
    let payment_method = non_blank(req.payment_method)
        .map(|m| m.parse::<PaymentMethod>())
        .transpose()?;

    let stored = state
        .carts
        .edit_order(&order_id, customer_id, payment_method, req.etag)
        .await?;
    let items = state.carts.line_items(&order_id).await?;
    let customer = match &stored.entity.customer_id {
        Some(customer_id) => state
            .catalog
            .get_customer(customer_id)
            .await?
            .map(|c| c.entity),
        None => None,
    };

    Ok(Json(OrderDetailsResponse {
        order: stored.entity.into(),
        etag: stored.etag,
        items,
        customer,
    }))
}

/// DELETE /orders/{id} — delete an order and its line items.
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.carts.delete_order(&parse_order_id(&id)?).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::order_not_found(&id))
    }
}

/// GET /orders/{id}/confirmation — the view shown after checkout.
#[tracing::instrument(skip(state))]
pub async fn confirmation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ConfirmationResponse>, ApiError> {
    let details = state
        .queries
        .order_details(&parse_order_id(&id)?)
        .await
        .ok_or_else(|| ApiError::order_not_found(&id))?;

    Ok(Json(ConfirmationResponse {
        delivery_message: details.order.delivery_message(),
        order: details.order.into(),
        items: details.items,
        customer: details.customer,
    }))
}

/// Reads an order ID from a path. Anything that is not an order ID cannot
/// name an order, so it is answered like a missing one.
pub(crate) fn parse_order_id(raw: &str) -> Result<OrderId, ApiError> {
    OrderId::parse(raw).ok_or_else(|| ApiError::order_not_found(raw))
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
