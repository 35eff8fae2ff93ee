//! Shared, refreshable snapshot of all events.
//!
//! Every connected view reads the same catalog. A change notice from the
//! store triggers a reload; while one reload is in flight further requests
//! are suppressed instead of queued, so a notice that arrives mid-reload can
//! be missed until the next one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use kaartmiddag_core::error::DomainError;
use kaartmiddag_core::repository::DocumentRepository;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::application::query_handlers;
use crate::domain::aggregates::Event;

/// Result of a refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The catalog was reloaded and now holds this many events.
    Loaded(usize),
    /// Another refresh was already running; nothing was done.
    Suppressed,
}

/// In-memory list of events kept in sync with the document store.
pub struct EventCatalog {
    repo: Arc<dyn DocumentRepository>,
    events: RwLock<Vec<Event>>,
    loading: AtomicBool,
}

/// Clears the loading flag when a refresh ends, including on error.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl EventCatalog {
    /// Creates an empty catalog reading from `repo`.
    #[must_use]
    pub fn new(repo: Arc<dyn DocumentRepository>) -> Self {
        Self {
            repo,
            events: RwLock::new(Vec::new()),
            loading: AtomicBool::new(false),
        }
    }

    /// Copy of the current list, newest event first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Event> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a refresh is currently running.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Reloads every event from the store unless a reload is already running.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store cannot be read. The
    /// previous snapshot is kept in that case.
    pub async fn refresh(&self) -> Result<RefreshOutcome, DomainError> {
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("refresh already in flight");
            return Ok(RefreshOutcome::Suppressed);
        }
        let _guard = LoadingGuard(&self.loading);

        let events = query_handlers::list_events(self.repo.as_ref()).await?;
        let count = events.len();
        *self
            .events
            .write()
            .unwrap_or_else(PoisonError::into_inner) = events;
        info!(count, "event catalog refreshed");
        Ok(RefreshOutcome::Loaded(count))
    }

    /// Refreshes the catalog on every change notice from the store.
    ///
    /// Returns `None` when the store offers no change feed.
    pub fn watch(self: Arc<Self>) -> Option<JoinHandle<()>> {
        let mut notices = self.repo.subscribe()?;
        Some(tokio::spawn(async move {
            loop {
                match notices.recv().await {
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "change notices coalesced");
                    }
                    Err(RecvError::Closed) => break,
                }
                let catalog = Arc::clone(&self);
                tokio::spawn(async move {
                    if let Err(e) = catalog.refresh().await {
                        warn!(error = %e, "event catalog refresh failed");
                    }
                });
            }
            debug!("change feed closed");
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use kaartmiddag_core::repository::{ChangeNotice, StoredDocument};
    use tokio::sync::{Notify, broadcast};
    use uuid::Uuid;

    use super::*;
    use crate::application::command_handlers::to_stored_document;
    use kaartmiddag_test_support::{
        FailingDocumentRepository, FixedClock, RecordingDocumentRepository, SequenceIds,
    };

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 9, 26, 13, 30, 0).unwrap())
    }

    fn stored(title: &str, ids: &SequenceIds) -> StoredDocument {
        let event = Event::create(title, &clock(), ids).unwrap();
        to_stored_document(&event, &clock()).unwrap()
    }

    /// Blocks `list` until released so a refresh can be held in flight.
    struct GatedRepository {
        inner: RecordingDocumentRepository,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl DocumentRepository for GatedRepository {
        async fn list(&self) -> Result<Vec<StoredDocument>, DomainError> {
            self.entered.notify_one();
            self.release.notified().await;
            self.inner.list().await
        }

        async fn get(&self, id: Uuid) -> Result<Option<StoredDocument>, DomainError> {
            self.inner.get(id).await
        }

        async fn put(&self, document: StoredDocument) -> Result<(), DomainError> {
            self.inner.put(document).await
        }

        async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
            self.inner.delete(id).await
        }
    }

    /// Serves documents and exposes a change feed the test can drive.
    struct BroadcastingRepository {
        inner: RecordingDocumentRepository,
        changes: broadcast::Sender<ChangeNotice>,
    }

    #[async_trait]
    impl DocumentRepository for BroadcastingRepository {
        async fn list(&self) -> Result<Vec<StoredDocument>, DomainError> {
            self.inner.list().await
        }

        async fn get(&self, id: Uuid) -> Result<Option<StoredDocument>, DomainError> {
            self.inner.get(id).await
        }

        async fn put(&self, document: StoredDocument) -> Result<(), DomainError> {
            self.inner.put(document).await?;
            let _ = self.changes.send(ChangeNotice);
            Ok(())
        }

        async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
            self.inner.delete(id).await
        }

        fn subscribe(&self) -> Option<broadcast::Receiver<ChangeNotice>> {
            Some(self.changes.subscribe())
        }
    }

    #[tokio::test]
    async fn test_refresh_loads_snapshot() {
        // Arrange
        let ids = SequenceIds::default();
        let repo = RecordingDocumentRepository::new(vec![stored("A", &ids), stored("B", &ids)]);
        let catalog = EventCatalog::new(Arc::new(repo));

        // Act
        let outcome = catalog.refresh().await.unwrap();

        // Assert
        assert_eq!(outcome, RefreshOutcome::Loaded(2));
        let titles: Vec<String> = catalog.snapshot().iter().map(|e| e.title().to_owned()).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert!(!catalog.is_loading());
    }

    #[tokio::test]
    async fn test_refresh_is_suppressed_while_one_is_in_flight() {
        // Arrange
        let ids = SequenceIds::default();
        let repo = Arc::new(GatedRepository {
            inner: RecordingDocumentRepository::new(vec![stored("A", &ids)]),
            entered: Notify::new(),
            release: Notify::new(),
        });
        let catalog = Arc::new(EventCatalog::new(repo.clone()));
        let first = tokio::spawn({
            let catalog = Arc::clone(&catalog);
            async move { catalog.refresh().await }
        });
        repo.entered.notified().await;

        // Act
        let second = catalog.refresh().await.unwrap();
        repo.release.notify_one();
        let first = first.await.unwrap().unwrap();

        // Assert
        assert_eq!(second, RefreshOutcome::Suppressed);
        assert_eq!(first, RefreshOutcome::Loaded(1));
        assert!(!catalog.is_loading());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot_and_clears_flag() {
        let catalog = EventCatalog::new(Arc::new(FailingDocumentRepository));

        let result = catalog.refresh().await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
        assert!(catalog.snapshot().is_empty());
        assert!(!catalog.is_loading());
    }

    #[tokio::test]
    async fn test_watch_refreshes_on_change_notice() {
        // Arrange
        let ids = SequenceIds::default();
        let (changes, _) = broadcast::channel(16);
        let repo = Arc::new(BroadcastingRepository {
            inner: RecordingDocumentRepository::new(Vec::new()),
            changes,
        });
        let catalog = Arc::new(EventCatalog::new(repo.clone()));
        let handle = Arc::clone(&catalog).watch().unwrap();

        // Act
        repo.put(stored("Kaartmiddag", &ids)).await.unwrap();

        // Assert
        let mut attempts = 0;
        while catalog.snapshot().is_empty() && attempts < 100 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            attempts += 1;
        }
        assert_eq!(catalog.snapshot()[0].title(), "Kaartmiddag");
        handle.abort();
    }

    #[test]
    fn test_watch_without_change_feed_returns_none() {
        let catalog = Arc::new(EventCatalog::new(Arc::new(
            RecordingDocumentRepository::new(Vec::new()),
        )));

        assert!(catalog.watch().is_none());
    }
}
