//! Shared application state.

use std::sync::Arc;

use kaartmiddag_core::clock::Clock;
use kaartmiddag_core::ids::IdGenerator;
use kaartmiddag_core::repository::DocumentRepository;
use kaartmiddag_event::application::catalog::EventCatalog;
use kaartmiddag_event::config::EventSettings;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock for event dates and document timestamps.
    pub clock: Arc<dyn Clock>,
    /// Generator for event, participant and table ids.
    pub ids: Arc<dyn IdGenerator>,
    /// Document store holding every event.
    pub repository: Arc<dyn DocumentRepository>,
    /// Table size and game order policy.
    pub settings: EventSettings,
    /// Shared event list, refreshed on change notices.
    pub catalog: Arc<EventCatalog>,
}

impl AppState {
    /// Create new application state. The catalog reads from `repository`.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        repository: Arc<dyn DocumentRepository>,
        settings: EventSettings,
    ) -> Self {
        let catalog = Arc::new(EventCatalog::new(Arc::clone(&repository)));
        Self {
            clock,
            ids,
            repository,
            settings,
            catalog,
        }
    }
}
