//! Document repository abstraction.
//!
//! Every event is stored as one JSON document that is replaced in full on
//! each write. There is no version check: two writers on the same id race
//! and the last `put` wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::DomainError;

/// Stored representation of a whole event document.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Document identifier (the event id).
    pub id: Uuid,
    /// Serialized event.
    pub payload: serde_json::Value,
    /// Time of the last write.
    pub updated_at: DateTime<Utc>,
}

/// Signal that some document changed remotely. Carries no payload; every
/// notice means "refresh now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeNotice;

/// Repository trait for listing, loading, replacing and deleting documents.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Load every stored document.
    async fn list(&self) -> Result<Vec<StoredDocument>, DomainError>;

    /// Load a single document, or `None` when the id is unknown.
    async fn get(&self, id: Uuid) -> Result<Option<StoredDocument>, DomainError>;

    /// Insert or fully replace the document with the same id.
    async fn put(&self, document: StoredDocument) -> Result<(), DomainError>;

    /// Remove the document with the given id. Unknown ids are ignored.
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;

    /// Subscribe to change notices. Repositories without a change feed
    /// return `None`.
    fn subscribe(&self) -> Option<broadcast::Receiver<ChangeNotice>> {
        None
    }
}
