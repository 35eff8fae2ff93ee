//! Test repositories: mock `DocumentRepository` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use kaartmiddag_core::error::DomainError;
use kaartmiddag_core::repository::{DocumentRepository, StoredDocument};
use uuid::Uuid;

/// A document repository that serves the documents it was seeded with and
/// records every `put` and `delete` call. Puts replace the served document,
/// so a handler chain behaves like a real store.
#[derive(Debug)]
pub struct RecordingDocumentRepository {
    documents: Mutex<Vec<StoredDocument>>,
    puts: Mutex<Vec<StoredDocument>>,
    deletes: Mutex<Vec<Uuid>>,
}

impl RecordingDocumentRepository {
    /// Create a new recording repository seeded with `documents`.
    #[must_use]
    pub fn new(documents: Vec<StoredDocument>) -> Self {
        Self {
            documents: Mutex::new(documents),
            puts: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of all documents that were put.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn put_documents(&self) -> Vec<StoredDocument> {
        self.puts.lock().unwrap().clone()
    }

    /// Returns a snapshot of all ids that were deleted.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn deleted_ids(&self) -> Vec<Uuid> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentRepository for RecordingDocumentRepository {
    async fn list(&self) -> Result<Vec<StoredDocument>, DomainError> {
        Ok(self.documents.lock().unwrap().clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredDocument>, DomainError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == id)
            .cloned())
    }

    async fn put(&self, document: StoredDocument) -> Result<(), DomainError> {
        let mut documents = self.documents.lock().unwrap();
        documents.retain(|d| d.id != document.id);
        documents.push(document.clone());
        self.puts.lock().unwrap().push(document);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.documents.lock().unwrap().retain(|d| d.id != id);
        self.deletes.lock().unwrap().push(id);
        Ok(())
    }
}

/// A document repository that never holds anything and silently accepts
/// writes. Useful for testing "event not found" scenarios and creation
/// commands.
#[derive(Debug)]
pub struct EmptyDocumentRepository;

#[async_trait]
impl DocumentRepository for EmptyDocumentRepository {
    async fn list(&self) -> Result<Vec<StoredDocument>, DomainError> {
        Ok(vec![])
    }

    async fn get(&self, _id: Uuid) -> Result<Option<StoredDocument>, DomainError> {
        Ok(None)
    }

    async fn put(&self, _document: StoredDocument) -> Result<(), DomainError> {
        Ok(())
    }

    async fn delete(&self, _id: Uuid) -> Result<(), DomainError> {
        Ok(())
    }
}

/// A document repository that always returns an infrastructure error. Useful
/// for testing error-handling paths.
#[derive(Debug)]
pub struct FailingDocumentRepository;

#[async_trait]
impl DocumentRepository for FailingDocumentRepository {
    async fn list(&self) -> Result<Vec<StoredDocument>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn get(&self, _id: Uuid) -> Result<Option<StoredDocument>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn put(&self, _document: StoredDocument) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn delete(&self, _id: Uuid) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
