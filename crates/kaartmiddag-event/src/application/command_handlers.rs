//! Command handlers for the event context.
//!
//! This module contains application-level command handler functions that
//! orchestrate domain logic: load the event, compute the replacement, and
//! persist it with a single `put`. Nothing is written when the domain
//! operation fails.

use kaartmiddag_core::clock::Clock;
use kaartmiddag_core::command::Command;
use kaartmiddag_core::error::DomainError;
use kaartmiddag_core::ids::IdGenerator;
use kaartmiddag_core::repository::{DocumentRepository, StoredDocument};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::EventSettings;
use crate::domain::aggregates::Event;
use crate::domain::commands::{
    AddParticipant, AssignTables, ChangeParticipantGame, ClearScore, CreateEvent, DeleteEvent,
    FinishEvent, FinishRound, RemoveParticipant, RenameEvent, ResetTables, StartRound,
    UpdateScore,
};

/// Serializes an event into its stored document form.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if serialization fails.
pub(crate) fn to_stored_document(
    event: &Event,
    clock: &dyn Clock,
) -> Result<StoredDocument, DomainError> {
    let payload = serde_json::to_value(event)
        .map_err(|e| DomainError::Infrastructure(format!("event serialization failed: {e}")))?;
    Ok(StoredDocument {
        id: event.id(),
        payload,
        updated_at: clock.now(),
    })
}

/// Reconstitutes an `Event` from its stored document.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if document deserialization fails.
pub(crate) fn reconstitute(document: &StoredDocument) -> Result<Event, DomainError> {
    serde_json::from_value(document.payload.clone()).map_err(|e| {
        DomainError::Infrastructure(format!(
            "document {} deserialization failed: {e}",
            document.id
        ))
    })
}

/// Loads an event by id.
///
/// # Errors
///
/// Returns `DomainError::EventNotFound` for an unknown id, or
/// `DomainError::Infrastructure` if loading or deserialization fails.
pub(crate) async fn load_event(
    event_id: Uuid,
    repo: &dyn DocumentRepository,
) -> Result<Event, DomainError> {
    let document = repo
        .get(event_id)
        .await?
        .ok_or(DomainError::EventNotFound(event_id))?;
    reconstitute(&document)
}

async fn persist(
    command: &dyn Command,
    event: &Event,
    clock: &dyn Clock,
    repo: &dyn DocumentRepository,
) -> Result<(), DomainError> {
    repo.put(to_stored_document(event, clock)?).await?;
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        event_id = %event.id(),
        status = %event.status(),
        "event replaced"
    );
    Ok(())
}

/// Loads the event, applies `change`, and stores the replacement.
async fn replace_event<F>(
    command: &dyn Command,
    event_id: Uuid,
    clock: &dyn Clock,
    repo: &dyn DocumentRepository,
    change: F,
) -> Result<Event, DomainError>
where
    F: FnOnce(&Event) -> Result<Event, DomainError> + Send,
{
    let current = load_event(event_id, repo).await?;
    let next = change(&current).inspect_err(|e| {
        warn!(
            command_type = command.command_type(),
            correlation_id = %command.correlation_id(),
            event_id = %event_id,
            error = %e,
            "command rejected"
        );
    })?;
    persist(command, &next, clock, repo).await?;
    Ok(next)
}

/// Handles the `CreateEvent` command: creates a new event in registration
/// and persists it.
///
/// # Errors
///
/// Returns `DomainError` if the title is blank or persisting fails.
pub async fn handle_create_event(
    command: &CreateEvent,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    repo: &dyn DocumentRepository,
) -> Result<Event, DomainError> {
    let event = Event::create(&command.title, clock, ids)?;
    persist(command, &event, clock, repo).await?;
    Ok(event)
}

/// Handles the `RenameEvent` command.
///
/// # Errors
///
/// Returns `DomainError` if loading, validation, or persisting fails.
pub async fn handle_rename_event(
    command: &RenameEvent,
    clock: &dyn Clock,
    repo: &dyn DocumentRepository,
) -> Result<Event, DomainError> {
    replace_event(command, command.event_id, clock, repo, |e| {
        e.rename(&command.title)
    })
    .await
}

/// Handles the `DeleteEvent` command. Deleting an unknown id is a no-op.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the repository fails.
pub async fn handle_delete_event(
    command: &DeleteEvent,
    repo: &dyn DocumentRepository,
) -> Result<(), DomainError> {
    repo.delete(command.event_id).await?;
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id,
        event_id = %command.event_id,
        "event deleted"
    );
    Ok(())
}

/// Handles the `AddParticipant` command.
///
/// # Errors
///
/// Returns `DomainError` if loading, validation, or persisting fails.
pub async fn handle_add_participant(
    command: &AddParticipant,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    repo: &dyn DocumentRepository,
) -> Result<Event, DomainError> {
    replace_event(command, command.event_id, clock, repo, |e| {
        e.add_participant(&command.name, command.game, ids)
    })
    .await
}

/// Handles the `RemoveParticipant` command.
///
/// # Errors
///
/// Returns `DomainError` if loading, validation, or persisting fails.
pub async fn handle_remove_participant(
    command: &RemoveParticipant,
    clock: &dyn Clock,
    repo: &dyn DocumentRepository,
) -> Result<Event, DomainError> {
    replace_event(command, command.event_id, clock, repo, |e| {
        e.remove_participant(command.participant_id)
    })
    .await
}

/// Handles the `ChangeParticipantGame` command.
///
/// # Errors
///
/// Returns `DomainError` if loading, validation, or persisting fails.
pub async fn handle_change_participant_game(
    command: &ChangeParticipantGame,
    clock: &dyn Clock,
    repo: &dyn DocumentRepository,
) -> Result<Event, DomainError> {
    replace_event(command, command.event_id, clock, repo, |e| {
        e.change_participant_game(command.participant_id, command.game)
    })
    .await
}

/// Handles the `StartRound` command.
///
/// # Errors
///
/// Returns `DomainError` if loading, the transition, or persisting fails.
pub async fn handle_start_round(
    command: &StartRound,
    clock: &dyn Clock,
    repo: &dyn DocumentRepository,
) -> Result<Event, DomainError> {
    replace_event(command, command.event_id, clock, repo, Event::start_round).await
}

/// Handles the `FinishRound` command.
///
/// # Errors
///
/// Returns `DomainError` if loading, the balance check, or persisting fails.
pub async fn handle_finish_round(
    command: &FinishRound,
    clock: &dyn Clock,
    repo: &dyn DocumentRepository,
) -> Result<Event, DomainError> {
    replace_event(command, command.event_id, clock, repo, Event::finish_round).await
}

/// Handles the `FinishEvent` command.
///
/// # Errors
///
/// Returns `DomainError` if loading, the balance check, or persisting fails.
pub async fn handle_finish_event(
    command: &FinishEvent,
    clock: &dyn Clock,
    repo: &dyn DocumentRepository,
) -> Result<Event, DomainError> {
    replace_event(command, command.event_id, clock, repo, Event::finish_event).await
}

/// Handles the `AssignTables` command.
///
/// # Errors
///
/// Returns `DomainError` if loading, validation, or persisting fails.
pub async fn handle_assign_tables(
    command: &AssignTables,
    settings: &EventSettings,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    repo: &dyn DocumentRepository,
) -> Result<Event, DomainError> {
    replace_event(command, command.event_id, clock, repo, |e| {
        e.assign_tables(
            command.round_index,
            &command.table_numbers,
            settings,
            command.confirm_irregular_sizes,
            ids,
        )
    })
    .await
}

/// Handles the `ResetTables` command.
///
/// # Errors
///
/// Returns `DomainError` if loading, validation, or persisting fails.
pub async fn handle_reset_tables(
    command: &ResetTables,
    clock: &dyn Clock,
    repo: &dyn DocumentRepository,
) -> Result<Event, DomainError> {
    replace_event(command, command.event_id, clock, repo, |e| {
        e.reset_tables(command.round_index)
    })
    .await
}

/// Handles the `UpdateScore` command.
///
/// # Errors
///
/// Returns `DomainError` if loading, validation, or persisting fails.
pub async fn handle_update_score(
    command: &UpdateScore,
    clock: &dyn Clock,
    repo: &dyn DocumentRepository,
) -> Result<Event, DomainError> {
    replace_event(command, command.event_id, clock, repo, |e| {
        e.update_score(command.round_index, command.participant_id, &command.raw_value)
    })
    .await
}

/// Handles the `ClearScore` command.
///
/// # Errors
///
/// Returns `DomainError` if loading, validation, or persisting fails.
pub async fn handle_clear_score(
    command: &ClearScore,
    clock: &dyn Clock,
    repo: &dyn DocumentRepository,
) -> Result<Event, DomainError> {
    replace_event(command, command.event_id, clock, repo, |e| {
        e.clear_score(command.round_index, command.participant_id)
    })
    .await
}
