//! `PostgreSQL` implementation of the `DocumentRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use kaartmiddag_core::error::DomainError;
use kaartmiddag_core::repository::{ChangeNotice, DocumentRepository, StoredDocument};

use crate::schema::CHANGE_CHANNEL;

const NOTICE_CAPACITY: usize = 64;

type DocumentRow = (Uuid, serde_json::Value, DateTime<Utc>);

/// PostgreSQL-backed document repository.
#[derive(Debug, Clone)]
pub struct PgDocumentRepository {
    pool: PgPool,
    changes: broadcast::Sender<ChangeNotice>,
}

impl PgDocumentRepository {
    /// Creates a new `PgDocumentRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let (changes, _) = broadcast::channel(NOTICE_CAPACITY);
        Self { pool, changes }
    }

    /// Listens for `events_changed` notifications and forwards each one to
    /// the subscribers of this repository.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the listener connection
    /// cannot be established.
    pub async fn start_listener(&self) -> Result<JoinHandle<()>, DomainError> {
        let mut listener = PgListener::connect_with(&self.pool)
            .await
            .map_err(infrastructure)?;
        listener.listen(CHANGE_CHANNEL).await.map_err(infrastructure)?;

        let changes = self.changes.clone();
        Ok(tokio::spawn(async move {
            loop {
                match listener.recv().await {
                    Ok(notification) => {
                        debug!(payload = notification.payload(), "change notification");
                        // No subscribers is not an error.
                        let _ = changes.send(ChangeNotice);
                    }
                    Err(e) => {
                        warn!(error = %e, "change listener stopped");
                        break;
                    }
                }
            }
        }))
    }
}

fn infrastructure(e: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(e.to_string())
}

fn to_document((id, payload, updated_at): DocumentRow) -> StoredDocument {
    StoredDocument {
        id,
        payload,
        updated_at,
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn list(&self) -> Result<Vec<StoredDocument>, DomainError> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            "SELECT id, document, updated_at FROM events ORDER BY updated_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(rows.into_iter().map(to_document).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredDocument>, DomainError> {
        let row: Option<DocumentRow> =
            sqlx::query_as("SELECT id, document, updated_at FROM events WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(infrastructure)?;
        Ok(row.map(to_document))
    }

    async fn put(&self, document: StoredDocument) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO events (id, document, updated_at) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE \
             SET document = EXCLUDED.document, updated_at = EXCLUDED.updated_at",
        )
        .bind(document.id)
        .bind(&document.payload)
        .bind(document.updated_at)
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(())
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<ChangeNotice>> {
        Some(self.changes.subscribe())
    }
}
