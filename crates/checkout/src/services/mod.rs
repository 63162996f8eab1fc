//! Collaborator traits and their implementations.

pub mod documents;
pub mod notifications;

pub use documents::{DocumentStore, FsDocumentStore, InMemoryDocumentStore};
pub use notifications::{
    InMemoryNotificationChannel, LogNotificationChannel, NotificationChannel,
    NotificationMessage, Topic, publish_best_effort,
};
