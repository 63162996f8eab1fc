//! Domain layer for the storefront checkout system.
//!
//! This crate provides:
//! - Order, line item, product and customer records
//! - The pricing engine (subtotal, 15% tax, fixed shipping)
//! - `CartService`, which assembles carts and keeps totals current
//! - `Catalog` for product and customer maintenance
//! - `StorefrontQueries`, the soft-fail read side

pub mod catalog;
pub mod error;
pub mod order;
pub mod pricing;
pub mod queries;
pub mod value_objects;

pub use catalog::{Catalog, Customer, DEFAULT_LOW_STOCK_THRESHOLD, Product};
pub use error::DomainError;
pub use order::{CartHandle, CartService, CheckoutState, LineItem, Order, PaymentMethod};
pub use pricing::{SHIPPING_FEE, TAX_RATE, Totals, calculate_totals};
pub use queries::{ContractSummary, OrderDetails, OrderSummary, StorefrontQueries};
pub use value_objects::{CustomerId, Money, ProductId};
