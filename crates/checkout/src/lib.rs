//! Checkout for the storefront.
//!
//! `CheckoutCoordinator::complete_order` validates the payment method and
//! any credit contract, decrements stock through the `InventoryDispatcher`,
//! assigns a tracking number and delivery estimate, and announces the
//! order. Document storage and notifications sit behind the
//! `DocumentStore` and `NotificationChannel` traits.

pub mod contracts;
pub mod coordinator;
pub mod delivery;
pub mod document;
pub mod error;
pub mod inventory;
pub mod random;
pub mod services;
pub mod tracking;

pub use contracts::ContractArchive;
pub use coordinator::{CheckoutCoordinator, CheckoutRequest, OrderConfirmation};
pub use delivery::estimate_delivery;
pub use document::{ALLOWED_EXTENSIONS, ContractDocument, MAX_CONTRACT_BYTES};
pub use error::{CheckoutError, Result};
pub use inventory::{InventoryDispatcher, InventoryReport};
pub use random::{RandomSource, SeededRandom, SequenceRandom, ThreadRandom};
pub use services::{
    DocumentStore, FsDocumentStore, InMemoryDocumentStore, InMemoryNotificationChannel,
    LogNotificationChannel, NotificationChannel, NotificationMessage, Topic, publish_best_effort,
};
pub use tracking::TrackingNumber;
