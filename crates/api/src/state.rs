//! Shared application state.

use std::sync::Arc;

use checkout::{
    CheckoutCoordinator, ContractArchive, DocumentStore, InMemoryDocumentStore,
    LogNotificationChannel, NotificationChannel, RandomSource, ThreadRandom,
};
use domain::{CartService, Catalog, StorefrontQueries};
use record_store::{InMemoryRecordStore, RecordStore};

pub type SharedRecordStore = Arc<dyn RecordStore>;
pub type SharedDocumentStore = Arc<dyn DocumentStore>;
pub type SharedNotificationChannel = Arc<dyn NotificationChannel>;

/// Services every handler can reach. Backends are chosen at startup.
pub struct AppState {
    pub carts: CartService<SharedRecordStore>,
    pub catalog: Catalog<SharedRecordStore>,
    pub queries: StorefrontQueries<SharedRecordStore>,
    pub checkout:
        CheckoutCoordinator<SharedRecordStore, SharedDocumentStore, SharedNotificationChannel>,
    pub contracts: ContractArchive<SharedDocumentStore>,
    pub notifications: SharedNotificationChannel,
}

impl AppState {
    /// Wires the services over the given backends.
    pub fn new(
        store: SharedRecordStore,
        documents: SharedDocumentStore,
        notifications: SharedNotificationChannel,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            carts: CartService::new(store.clone()),
            catalog: Catalog::new(store.clone()),
            queries: StorefrontQueries::new(store.clone()),
            checkout: CheckoutCoordinator::new(
                store,
                documents.clone(),
                notifications.clone(),
                random,
            ),
            contracts: ContractArchive::new(documents),
            notifications,
        }
    }
}

/// Creates state backed entirely by in-process stores, with notifications
/// written to the log.
pub fn create_default_state() -> Arc<AppState> {
    Arc::new(AppState::new(
        Arc::new(InMemoryRecordStore::new()),
        Arc::new(InMemoryDocumentStore::new()),
        Arc::new(LogNotificationChannel),
        Arc::new(ThreadRandom),
    ))
}
