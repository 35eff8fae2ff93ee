//! Query handlers for the event context.
//!
//! This module contains query handlers that load stored events and return
//! read-only view DTOs.

use chrono::NaiveDate;
use kaartmiddag_core::error::DomainError;
use kaartmiddag_core::repository::DocumentRepository;
use serde::Serialize;
use uuid::Uuid;

use crate::application::command_handlers;
use crate::config::EventSettings;
use crate::domain::aggregates::Event;
use crate::domain::model::EventStatus;
use crate::domain::results::{self, GameStandings};
use crate::domain::scores::TableBalance;

/// Summary line for the event overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    /// The event identifier.
    pub event_id: Uuid,
    /// Display title.
    pub title: String,
    /// Calendar date.
    pub date: NaiveDate,
    /// Current status.
    pub status: EventStatus,
    /// Number of registered participants.
    pub participant_count: usize,
}

impl From<&Event> for EventSummary {
    fn from(event: &Event) -> Self {
        Self {
            event_id: event.id(),
            title: event.title().to_owned(),
            date: event.date(),
            status: event.status(),
            participant_count: event.participants().len(),
        }
    }
}

/// Balance of every table in one round.
#[derive(Debug, Serialize)]
pub struct RoundBalanceView {
    /// Round number (1 or 2).
    pub round: u8,
    /// Whether the round has been finished.
    pub finished: bool,
    /// Whether every table is complete and sums to zero.
    pub balanced: bool,
    /// Per-table balance.
    pub tables: Vec<TableBalance>,
}

/// Final ranking of an event.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsView {
    /// The event identifier.
    pub event_id: Uuid,
    /// Display title.
    pub title: String,
    /// Current status; rankings are available before results are final.
    pub status: EventStatus,
    /// Rankings per game in the configured order.
    pub games: Vec<GameStandings>,
}

/// Lists every stored event, newest first, then by title.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if loading or deserialization fails.
pub async fn list_events(repo: &dyn DocumentRepository) -> Result<Vec<Event>, DomainError> {
    let mut events = repo
        .list()
        .await?
        .iter()
        .map(command_handlers::reconstitute)
        .collect::<Result<Vec<_>, _>>()?;
    events.sort_by(|a, b| b.date().cmp(&a.date()).then_with(|| a.title().cmp(b.title())));
    Ok(events)
}

/// Retrieves an event by id.
///
/// # Errors
///
/// Returns `DomainError::EventNotFound` if no document exists for the id.
/// Returns `DomainError::Infrastructure` if deserialization fails.
pub async fn get_event_by_id(
    event_id: Uuid,
    repo: &dyn DocumentRepository,
) -> Result<Event, DomainError> {
    command_handlers::load_event(event_id, repo).await
}

/// Retrieves the table balances of one round.
///
/// # Errors
///
/// Returns `DomainError::EventNotFound` or `DomainError::RoundNotFound` for
/// unknown ids, `DomainError::Infrastructure` if loading fails.
pub async fn get_round_balance(
    event_id: Uuid,
    round_index: usize,
    repo: &dyn DocumentRepository,
) -> Result<RoundBalanceView, DomainError> {
    let event = command_handlers::load_event(event_id, repo).await?;
    let round = event.round(round_index)?;
    let tables = round.balance();
    Ok(RoundBalanceView {
        round: round.number,
        finished: round.finished,
        balanced: tables.iter().all(TableBalance::is_balanced),
        tables,
    })
}

/// Computes the ranking of an event.
///
/// # Errors
///
/// Returns `DomainError::EventNotFound` for an unknown id and
/// `DomainError::Infrastructure` if loading fails.
pub async fn get_results(
    event_id: Uuid,
    settings: &EventSettings,
    repo: &dyn DocumentRepository,
) -> Result<ResultsView, DomainError> {
    let event = command_handlers::load_event(event_id, repo).await?;
    Ok(ResultsView {
        event_id,
        title: event.title().to_owned(),
        status: event.status(),
        games: results::standings(&event, settings),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use kaartmiddag_core::error::DomainError;
    use uuid::Uuid;

    use super::*;
    use crate::application::command_handlers::to_stored_document;
    use crate::domain::model::Game;
    use crate::domain::tables::TableNumbers;
    use kaartmiddag_test_support::{
        EmptyDocumentRepository, FixedClock, RecordingDocumentRepository, SequenceIds,
    };

    fn clock_on(day: u32) -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 9, day, 13, 30, 0).unwrap())
    }

    fn scored_event(ids: &SequenceIds) -> Event {
        let mut event = Event::create("Kaartmiddag", &clock_on(26), ids).unwrap();
        for name in ["Anna", "Bert", "Cor", "Dina"] {
            event = event.add_participant(name, Game::Rikken, ids).unwrap();
        }
        let numbers: TableNumbers = event.participants().iter().map(|p| (p.id, 1)).collect();
        event = event
            .start_round()
            .unwrap()
            .assign_tables(0, &numbers, &EventSettings::default(), false, ids)
            .unwrap();
        let players: Vec<Uuid> = event.participants().iter().map(|p| p.id).collect();
        for (id, raw) in players.iter().zip(["6", "-2", "-4"]) {
            event = event.update_score(0, *id, raw).unwrap();
        }
        event
    }

    #[tokio::test]
    async fn test_list_events_sorts_newest_first() {
        // Arrange
        let ids = SequenceIds::default();
        let older = Event::create("Augustus", &clock_on(1), &ids).unwrap();
        let newer = Event::create("September", &clock_on(26), &ids).unwrap();
        let repo = RecordingDocumentRepository::new(vec![
            to_stored_document(&older, &clock_on(1)).unwrap(),
            to_stored_document(&newer, &clock_on(26)).unwrap(),
        ]);

        // Act
        let events = list_events(&repo).await.unwrap();

        // Assert
        let titles: Vec<&str> = events.iter().map(Event::title).collect();
        assert_eq!(titles, vec!["September", "Augustus"]);
        assert_eq!(EventSummary::from(&events[0]).participant_count, 0);
    }

    #[tokio::test]
    async fn test_get_round_balance_reports_incomplete_table() {
        // Arrange
        let ids = SequenceIds::default();
        let event = scored_event(&ids);
        let repo = RecordingDocumentRepository::new(vec![
            to_stored_document(&event, &clock_on(26)).unwrap(),
        ]);

        // Act
        let view = get_round_balance(event.id(), 0, &repo).await.unwrap();

        // Assert
        assert_eq!(view.round, 1);
        assert!(!view.finished);
        assert!(!view.balanced);
        assert_eq!(view.tables[0].sum, 0);
        assert_eq!(view.tables[0].missing, vec![event.participants()[3].id]);
    }

    #[tokio::test]
    async fn test_get_round_balance_unknown_round_is_not_found() {
        let ids = SequenceIds::default();
        let event = scored_event(&ids);
        let repo = RecordingDocumentRepository::new(vec![
            to_stored_document(&event, &clock_on(26)).unwrap(),
        ]);

        let result = get_round_balance(event.id(), 1, &repo).await;

        assert!(matches!(result, Err(DomainError::RoundNotFound(1))));
    }

    #[tokio::test]
    async fn test_get_results_ranks_without_blocking_on_missing_scores() {
        // Arrange
        let ids = SequenceIds::default();
        let event = scored_event(&ids);
        let repo = RecordingDocumentRepository::new(vec![
            to_stored_document(&event, &clock_on(26)).unwrap(),
        ]);

        // Act
        let view = get_results(event.id(), &EventSettings::default(), &repo)
            .await
            .unwrap();

        // Assert
        assert_eq!(view.games[0].game, Game::Jokeren);
        assert!(view.games[0].standings.is_empty());
        let rikken: Vec<(&str, i128)> = view.games[1]
            .standings
            .iter()
            .map(|s| (s.name.as_str(), s.total))
            .collect();
        assert_eq!(rikken, vec![("Anna", 6), ("Dina", 0), ("Bert", -2), ("Cor", -4)]);
        assert!(view.games[1].standings[3].is_poedel_prize);
    }

    #[tokio::test]
    async fn test_get_event_by_id_returns_not_found_when_missing() {
        let event_id = Uuid::new_v4();

        let result = get_event_by_id(event_id, &EmptyDocumentRepository).await;

        match result.unwrap_err() {
            DomainError::EventNotFound(id) => assert_eq!(id, event_id),
            other => panic!("expected EventNotFound, got {other:?}"),
        }
    }
}
