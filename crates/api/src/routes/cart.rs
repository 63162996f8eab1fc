//! Cart endpoints. The cart handle travels in the `x-cart-id` header.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use domain::{LineItem, Order, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::orders::{OrderView, parse_order_id};
use crate::session::CartSession;
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct AddToCartRequest {
    pub product_id: String,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

#[derive(Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartResponse {
    #[serde(flatten)]
    pub order: OrderView,
    pub items: Vec<LineItem>,
}

impl CartResponse {
    async fn load(state: &AppState, order: Order) -> Result<Self, ApiError> {
        let items = state.carts.line_items(&order.id).await?;
        Ok(Self {
            order: order.into(),
            items,
        })
    }
}

// -- Handlers --

/// GET /cart — the caller's cart, opened if none is bound.
#[tracing::instrument(skip(state, session))]
pub async fn current(
    State(state): State<Arc<AppState>>,
    mut session: CartSession,
) -> Result<(CartSession, Json<CartResponse>), ApiError> {
    let cart = state.carts.start_or_continue(session.handle_mut()).await?;
    let response = CartResponse::load(&state, cart.entity).await?;
    Ok((session, Json(response)))
}

/// POST /cart/items — add a product to the caller's cart.
#[tracing::instrument(skip(state, session, req), fields(product_id = %req.product_id))]
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    mut session: CartSession,
    Json(req): Json<AddToCartRequest>,
) -> Result<(CartSession, Json<CartResponse>), ApiError> {
    let order = state
        .carts
        .add_product(
            session.handle_mut(),
            &ProductId::new(req.product_id),
            req.quantity,
        )
        .await?;
    let response = CartResponse::load(&state, order).await?;
    Ok((session, Json(response)))
}

/// PUT /orders/{id}/items/{product_id} — set a line item's quantity.
/// A quantity of 0 removes the item.
#[tracing::instrument(skip(state, req))]
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path((id, product_id)): Path<(String, String)>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let order = state
        .carts
        .update_quantity(
            &parse_order_id(&id)?,
            &ProductId::new(product_id),
            req.quantity,
        )
        .await?;
    Ok(Json(CartResponse::load(&state, order).await?))
}

/// DELETE /orders/{id}/items/{product_id} — remove a line item.
#[tracing::instrument(skip(state))]
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    Path((id, product_id)): Path<(String, String)>,
) -> Result<Json<CartResponse>, ApiError> {
    let order = state
        .carts
        .remove_item(&parse_order_id(&id)?, &ProductId::new(product_id))
        .await?;
    Ok(Json(CartResponse::load(&state, order).await?))
}
