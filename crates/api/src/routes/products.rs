//! Product catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use checkout::{NotificationMessage, Topic, publish_best_effort};
use domain::{DEFAULT_LOW_STOCK_THRESHOLD, DomainError, Product, ProductId};
use record_store::EntityTag;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
}

#[derive(Deserialize)]
pub struct ProductRequest {
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub price_rand: i64,
    #[serde(default)]
    pub price_cents: i64,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub key_ingredients: String,
    pub stock_quantity: i64,
    pub low_stock_threshold: Option<i64>,
    #[serde(default)]
    pub image_url: String,
}

impl ProductRequest {
    fn apply(self, product: &mut Product) {
        product.name = self.name;
        product.brand = self.brand;
        product.description = self.description;
        product.category = self.category;
        product.price_rand = self.price_rand;
        product.price_cents = self.price_cents;
        product.size = self.size;
        product.key_ingredients = self.key_ingredients;
        product.stock_quantity = self.stock_quantity;
        product.low_stock_threshold = self
            .low_stock_threshold
            .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
        product.image_url = self.image_url;
    }
}

#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub etag: EntityTag,
    #[serde(flatten)]
    pub product: ProductRequest,
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    #[serde(flatten)]
    pub product: Product,
    pub etag: EntityTag,
    pub low_stock: bool,
}

impl ProductResponse {
    fn new(product: Product, etag: EntityTag) -> Self {
        Self {
            low_stock: product.is_low_stock(),
            product,
            etag,
        }
    }
}

// -- Handlers --

/// GET /products — all products, optionally narrowed to one category.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListProductsQuery>,
) -> Json<Vec<Product>> {
    let products = match query.category.filter(|c| !c.is_empty()) {
        Some(category) => state.queries.products_in_category(&category).await,
        None => state.queries.list_products().await,
    };
    Json(products)
}

/// POST /products — add a product and announce it.
#[tracing::instrument(skip(state, req), fields(name = %req.name))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let mut product = Product::new(String::new(), 0, 0, 0);
    req.apply(&mut product);

    let stored = state.catalog.add_product(product).await?;
    let message = NotificationMessage::product_added(&stored.entity.id, &stored.entity.name);
    publish_best_effort(&state.notifications, Topic::Products, &message).await;

    Ok((
        StatusCode::CREATED,
        Json(ProductResponse::new(stored.entity, stored.etag)),
    ))
}

/// GET /products/{id} — one product.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_id = ProductId::new(id);
    let stored = state
        .catalog
        .get_product(&product_id)
        .await?
        .ok_or(DomainError::ProductNotFound(product_id))?;
    Ok(Json(ProductResponse::new(stored.entity, stored.etag)))
}

/// PUT /products/{id} — replace a product's fields.
///
/// A stock level left at or below the threshold raises a low-stock signal.
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let mut product = Product::new(String::new(), 0, 0, 0).with_id(id);
    req.product.apply(&mut product);

    let etag = state.catalog.update_product(&product, req.etag).await?;
    state.checkout.inventory().check_low_stock(&product).await;

    Ok(Json(ProductResponse::new(product, etag)))
}

/// DELETE /products/{id} — remove a product.
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let product_id = ProductId::new(id);
    if state.catalog.delete_product(&product_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(DomainError::ProductNotFound(product_id).into())
    }
}
