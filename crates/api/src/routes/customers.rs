//! Customer endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use checkout::{NotificationMessage, Topic, publish_best_effort};
use domain::{Customer, CustomerId, DomainError, Order};
use record_store::EntityTag;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct CustomerRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub shipping_address: String,
}

impl CustomerRequest {
    fn apply(self, customer: &mut Customer) {
        customer.name = self.name;
        customer.email = self.email;
        customer.phone = self.phone;
        customer.shipping_address = self.shipping_address;
    }
}

#[derive(Deserialize)]
pub struct UpdateCustomerRequest {
    pub etag: EntityTag,
    #[serde(flatten)]
    pub customer: CustomerRequest,
}

// -- Response types --

#[derive(Serialize)]
pub struct CustomerResponse {
    #[serde(flatten)]
    pub customer: Customer,
    pub etag: EntityTag,
}

#[derive(Serialize)]
pub struct CustomerDetailsResponse {
    #[serde(flatten)]
    pub customer: CustomerResponse,
    pub orders: Vec<Order>,
    pub contracts: Vec<String>,
}

// -- Handlers --

/// GET /customers — all customers.
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<Customer>> {
    Json(state.queries.list_customers().await)
}

/// POST /customers — register a customer and announce it.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>), ApiError> {
    let mut customer = Customer::new(String::new(), String::new());
    req.apply(&mut customer);

    let stored = state.catalog.add_customer(customer).await?;
    let message =
        NotificationMessage::customer_registered(&stored.entity.id, &stored.entity.name);
    publish_best_effort(&state.notifications, Topic::Customers, &message).await;

    Ok((
        StatusCode::CREATED,
        Json(CustomerResponse {
            customer: stored.entity,
            etag: stored.etag,
        }),
    ))
}

/// GET /customers/{id} — a customer with their orders and stored contracts.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CustomerDetailsResponse>, ApiError> {
    let customer_id = CustomerId::new(id);
    let stored = state
        .catalog
        .get_customer(&customer_id)
        .await?
        .ok_or_else(|| DomainError::CustomerNotFound(customer_id.clone()))?;

    let orders = state.queries.orders_for_customer(&customer_id).await;
    let contracts = state.contracts.list_customer_contracts(&customer_id).await;

    Ok(Json(CustomerDetailsResponse {
        customer: CustomerResponse {
            customer: stored.entity,
            etag: stored.etag,
        },
        orders,
        contracts,
    }))
}

/// PUT /customers/{id} — replace a customer's fields.
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCustomerRequest>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let mut customer = Customer::new(String::new(), String::new()).with_id(id);
    req.customer.apply(&mut customer);

    let etag = state.catalog.update_customer(&customer, req.etag).await?;
    Ok(Json(CustomerResponse { customer, etag }))
}

/// DELETE /customers/{id} — remove a customer. Their orders are kept.
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let customer_id = CustomerId::new(id);
    if state.catalog.delete_customer(&customer_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(DomainError::CustomerNotFound(customer_id).into())
    }
}
