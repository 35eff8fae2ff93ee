//! In-memory document store for development and tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use kaartmiddag_core::error::DomainError;
use kaartmiddag_core::repository::{ChangeNotice, DocumentRepository, StoredDocument};

const NOTICE_CAPACITY: usize = 64;

/// Keeps documents in a map and announces every write on a broadcast channel,
/// the same way the `PostgreSQL` trigger does.
#[derive(Debug)]
pub struct InMemoryDocumentRepository {
    documents: RwLock<BTreeMap<Uuid, StoredDocument>>,
    changes: broadcast::Sender<ChangeNotice>,
}

impl InMemoryDocumentRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            documents: RwLock::new(BTreeMap::new()),
            changes,
        }
    }

    fn announce(&self) {
        let _ = self.changes.send(ChangeNotice);
    }
}

impl Default for InMemoryDocumentRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn list(&self) -> Result<Vec<StoredDocument>, DomainError> {
        let mut documents: Vec<StoredDocument> =
            self.documents.read().await.values().cloned().collect();
        documents.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(documents)
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredDocument>, DomainError> {
        Ok(self.documents.read().await.get(&id).cloned())
    }

    async fn put(&self, document: StoredDocument) -> Result<(), DomainError> {
        self.documents.write().await.insert(document.id, document);
        self.announce();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        if self.documents.write().await.remove(&id).is_some() {
            self.announce();
        }
        Ok(())
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<ChangeNotice>> {
        Some(self.changes.subscribe())
    }
}
