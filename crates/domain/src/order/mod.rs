//! Orders, line items and the cart workflow.

mod cart;
mod entity;
mod payment;
mod state;

pub use cart::{CartHandle, CartService};
pub use entity::{LINE_ITEM_PARTITION_PREFIX, LineItem, ORDER_PARTITION, Order};
pub use payment::PaymentMethod;
pub use state::CheckoutState;
