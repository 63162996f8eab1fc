//! Cart handle carried in the `x-cart-id` header.
//!
//! Requests present the cart they are working on; responses echo the handle
//! after the operation. A response without the header means the handle was
//! released and the client should forget it. A header that is not an order
//! ID is ignored.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::HeaderValue;
use axum::http::header::HeaderName;
use axum::http::request::Parts;
use axum::response::{IntoResponseParts, ResponseParts};
use common::OrderId;
use domain::CartHandle;

/// Header carrying the bound cart order ID.
pub const CART_HEADER: HeaderName = HeaderName::from_static("x-cart-id");

/// The caller's cart handle, read from and written back to [`CART_HEADER`].
#[derive(Debug, Clone, Default)]
pub struct CartSession(pub CartHandle);

impl CartSession {
    /// Mutable access for services that bind or clear the handle.
    pub fn handle_mut(&mut self) -> &mut CartHandle {
        &mut self.0
    }
}

impl<S> FromRequestParts<S> for CartSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let handle = parts
            .headers
            .get(&CART_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .and_then(OrderId::parse)
            .map(CartHandle::bound)
            .unwrap_or_default();
        Ok(CartSession(handle))
    }
}

impl IntoResponseParts for CartSession {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if let Some(value) = self
            .0
            .order_id()
            .and_then(|id| HeaderValue::from_str(id.as_str()).ok())
        {
            res.headers_mut().insert(CART_HEADER, value);
        }
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use axum::response::IntoResponse;

    async fn extract(request: Request<()>) -> CartSession {
        let (mut parts, ()) = request.into_parts();
        let Ok(session) = CartSession::from_request_parts(&mut parts, &()).await;
        session
    }

    #[tokio::test]
    async fn reads_bound_handle_from_header() {
        let request = Request::builder()
            .header("x-cart-id", "AB12CD34")
            .body(())
            .unwrap();
        let session = extract(request).await;
        assert_eq!(session.0.order_id().map(OrderId::as_str), Some("AB12CD34"));
    }

    #[tokio::test]
    async fn missing_or_blank_header_is_unbound() {
        assert!(!extract(Request::new(())).await.0.is_bound());

        let blank = Request::builder().header("x-cart-id", " ").body(()).unwrap();
        assert!(!extract(blank).await.0.is_bound());
    }

    #[tokio::test]
    async fn malformed_header_is_unbound() {
        for value in ["ORDER", "PRODUCT", "ab12cd34", "AB12CD34EF"] {
            let request = Request::builder()
                .header("x-cart-id", value)
                .body(())
                .unwrap();
            assert!(!extract(request).await.0.is_bound(), "{value} bound a cart");
        }
    }

    #[test]
    fn bound_handle_is_echoed_and_cleared_handle_is_not() {
        let bound = CartSession(CartHandle::bound(OrderId::from_string("AB12CD34")));
        let response = (bound, "ok").into_response();
        assert_eq!(response.headers()[&CART_HEADER], "AB12CD34");

        let response = (CartSession::default(), "ok").into_response();
        assert!(response.headers().get(&CART_HEADER).is_none());
    }
}
