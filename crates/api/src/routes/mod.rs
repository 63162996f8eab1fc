//! HTTP handlers, one module per resource.

pub mod cart;
pub mod checkout;
pub mod contracts;
pub mod customers;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;
