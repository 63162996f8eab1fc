//! HTTP API server for the storefront checkout system.
//!
//! Exposes cart assembly, checkout, contracts and catalog maintenance as
//! JSON endpoints, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{Config, LogFormat};
pub use error::ApiError;
pub use session::{CART_HEADER, CartSession};
pub use state::{
    AppState, SharedDocumentStore, SharedNotificationChannel, SharedRecordStore,
    create_default_state,
};

/// Request body ceiling. Above the contract limit so oversized contracts
/// reach validation and get a readable message.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        // Orders
        .route("/orders", get(routes::orders::list))
        .route(
            "/orders/{id}",
            get(routes::orders::get)
                .put(routes::orders::edit)
                .delete(routes::orders::delete),
        )
        .route(
            "/orders/{id}/items/{product_id}",
            put(routes::cart::update_item).delete(routes::cart::remove_item),
        )
        .route("/orders/{id}/checkout", post(routes::checkout::complete))
        .route(
            "/orders/{id}/confirmation",
            get(routes::orders::confirmation),
        )
        // Cart
        .route("/cart", get(routes::cart::current))
        .route("/cart/items", post(routes::cart::add_item))
        // Contracts
        .route("/contracts", get(routes::contracts::list))
        .route(
            "/customers/{id}/contracts",
            get(routes::contracts::for_customer),
        )
        .route(
            "/customers/{id}/contracts/{file}",
            get(routes::contracts::download).delete(routes::contracts::delete),
        )
        // Catalog
        .route(
            "/products",
            get(routes::products::list).post(routes::products::create),
        )
        .route(
            "/products/{id}",
            get(routes::products::get)
                .put(routes::products::update)
                .delete(routes::products::delete),
        )
        .route(
            "/customers",
            get(routes::customers::list).post(routes::customers::create),
        )
        .route(
            "/customers/{id}",
            get(routes::customers::get)
                .put(routes::customers::update)
                .delete(routes::customers::delete),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers([CART_HEADER]),
        )
        .layer(TraceLayer::new_for_http())
}
