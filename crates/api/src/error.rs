//! API error types with HTTP response mapping.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;
use domain::DomainError;
use thiserror::Error;

/// Message shown when an entity-tag check fails.
pub const CONFLICT_MESSAGE: &str = "This record was modified by another user.";

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Something the caller asked for is gone. Answered with a redirect to
    /// the index the caller should return to.
    #[error("{message}")]
    NotFound {
        message: String,
        redirect: &'static str,
    },

    /// Malformed input.
    #[error("{0}")]
    BadRequest(String),

    /// Input was well formed but rejected; the caller may correct and retry.
    #[error("{0}")]
    Validation(String),

    /// A conditional write lost to another writer.
    #[error("This record was modified by another user.")]
    Conflict,

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Not-found error redirecting to the order index.
    pub fn order_not_found(id: impl std::fmt::Display) -> Self {
        ApiError::NotFound {
            message: format!("Order {id} not found"),
            redirect: "/orders",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let body = axum::Json(serde_json::json!({ "error": message }));

        match self {
            ApiError::NotFound { redirect, .. } => {
                tracing::info!(error = %message, redirect, "not found, redirecting");
                (StatusCode::SEE_OTHER, [(header::LOCATION, redirect)], body).into_response()
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, body).into_response(),
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, body).into_response(),
            ApiError::Conflict => {
                metrics::counter!("http_conflicts_total").increment(1);
                (StatusCode::CONFLICT, body).into_response()
            }
            ApiError::Internal(_) => {
                tracing::error!(error = %message, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        if err.is_conflict() {
            return ApiError::Conflict;
        }
        match err {
            DomainError::ProductNotFound(_) => ApiError::NotFound {
                message: err.to_string(),
                redirect: "/products",
            },
            DomainError::CustomerNotFound(_) => ApiError::NotFound {
                message: err.to_string(),
                redirect: "/customers",
            },
            DomainError::OrderNotFound(_) => ApiError::NotFound {
                message: err.to_string(),
                redirect: "/orders",
            },
            e if e.is_not_found() => ApiError::NotFound {
                message: e.to_string(),
                redirect: "/orders",
            },
            DomainError::InvalidQuantity { .. }
            | DomainError::InvalidPaymentMethod(_)
            | DomainError::AmountOverflow(_) => ApiError::BadRequest(err.to_string()),
            DomainError::Validation(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        if err.is_validation() {
            return ApiError::Validation(err.to_string());
        }
        if err.is_conflict() {
            return ApiError::Conflict;
        }
        match err {
            CheckoutError::Domain(e) => e.into(),
            CheckoutError::DocumentNotFound { .. } => ApiError::NotFound {
                message: err.to_string(),
                redirect: "/contracts",
            },
            e if e.is_not_found() => ApiError::NotFound {
                message: e.to_string(),
                redirect: "/orders",
            },
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::OrderId;
    use domain::ProductId;
    use record_store::{EntityTag, RecordKey, RecordStoreError};

    #[test]
    fn conflict_maps_to_409() {
        let err: ApiError = DomainError::Store(RecordStoreError::ConcurrencyConflict {
            key: RecordKey::new("ORDER", "A"),
            expected: EntityTag::new(),
            actual: EntityTag::new(),
        })
        .into();
        assert!(matches!(err, ApiError::Conflict));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn missing_product_redirects_to_products() {
        let err: ApiError = DomainError::ProductNotFound(ProductId::new("p1")).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/products");
    }

    #[test]
    fn checkout_validation_maps_to_422() {
        let err: ApiError = CheckoutError::ContractRequired.into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn wrapped_domain_errors_keep_their_mapping() {
        let err: ApiError =
            CheckoutError::Domain(DomainError::OrderNotFound(OrderId::from_string("X"))).into();
        assert!(matches!(err, ApiError::NotFound { redirect: "/orders", .. }));

        let err: ApiError = CheckoutError::Notification("down".to_string()).into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
