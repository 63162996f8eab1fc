//! Checkout endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use checkout::{CheckoutRequest, ContractDocument};
use common::OrderId;
use domain::{CustomerId, PaymentMethod};

use crate::error::ApiError;
use crate::routes::orders::{ConfirmationResponse, non_blank, parse_order_id};
use crate::session::CartSession;
use crate::state::AppState;

/// Form fields of a checkout submission.
#[derive(Debug, Default)]
struct CheckoutForm {
    customer_id: Option<String>,
    payment_method: Option<String>,
    contract: Option<ContractDocument>,
}

impl CheckoutForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = CheckoutForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "customer_id" => {
                    form.customer_id = Some(field.text().await.map_err(multipart_error)?);
                }
                "payment_method" => {
                    form.payment_method = Some(field.text().await.map_err(multipart_error)?);
                }
                "contract" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content = field.bytes().await.map_err(multipart_error)?;
                    if !content.is_empty() {
                        form.contract = Some(ContractDocument::new(file_name, content));
                    }
                }
                other => tracing::debug!(field = other, "ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    fn into_request(self, order_id: OrderId) -> Result<CheckoutRequest, ApiError> {
        let customer_id = non_blank(self.customer_id)
            .map(CustomerId::new)
            .ok_or_else(|| ApiError::Validation("Please select a customer".to_string()))?;
        let payment_method: PaymentMethod = non_blank(self.payment_method)
            .ok_or_else(|| ApiError::Validation("Please select a payment method".to_string()))?
            .parse()?;

        Ok(CheckoutRequest {
            order_id,
            customer_id,
            payment_method,
            contract: self.contract,
        })
    }
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::Validation("Contract file must be 5MB or smaller".to_string())
    } else {
        ApiError::BadRequest(e.body_text())
    }
}

/// POST /orders/{id}/checkout — complete an order.
///
/// Multipart form: `customer_id`, `payment_method` and, for credit, a
/// `contract` file. On success the cart header is dropped from the response.
#[tracing::instrument(skip(state, session, multipart))]
pub async fn complete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    mut session: CartSession,
    multipart: Multipart,
) -> Result<(CartSession, Json<ConfirmationResponse>), ApiError> {
    let order_id = parse_order_id(&id)?;
    let request = CheckoutForm::read(multipart)
        .await?
        .into_request(order_id.clone())?;

    let confirmation = state
        .checkout
        .complete_order(session.handle_mut(), request)
        .await?;

    // The order is placed; a failed customer lookup only thins the view.
    let customer = match &confirmation.order.customer_id {
        Some(customer_id) => state
            .catalog
            .get_customer(customer_id)
            .await
            .ok()
            .flatten()
            .map(|c| c.entity),
        None => None,
    };

    Ok((
        session,
        Json(ConfirmationResponse {
            delivery_message: confirmation.order.delivery_message(),
            order: confirmation.order.into(),
            items: confirmation.items,
            customer,
        }),
    ))
}
