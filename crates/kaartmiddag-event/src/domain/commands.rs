//! Commands for the event context.

use kaartmiddag_core::command::Command;
use uuid::Uuid;

use crate::domain::model::Game;
use crate::domain::tables::TableNumbers;

/// Command to create a new event.
#[derive(Debug, Clone)]
pub struct CreateEvent {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The event title.
    pub title: String,
}

impl Command for CreateEvent {
    fn command_type(&self) -> &'static str {
        "event.create_event"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to rename an event.
#[derive(Debug, Clone)]
pub struct RenameEvent {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The event identifier.
    pub event_id: Uuid,
    /// The new title.
    pub title: String,
}

impl Command for RenameEvent {
    fn command_type(&self) -> &'static str {
        "event.rename_event"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to delete an event.
#[derive(Debug, Clone)]
pub struct DeleteEvent {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The event identifier.
    pub event_id: Uuid,
}

impl Command for DeleteEvent {
    fn command_type(&self) -> &'static str {
        "event.delete_event"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to register a participant.
#[derive(Debug, Clone)]
pub struct AddParticipant {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The event identifier.
    pub event_id: Uuid,
    /// The participant's name.
    pub name: String,
    /// The game the participant plays.
    pub game: Game,
}

impl Command for AddParticipant {
    fn command_type(&self) -> &'static str {
        "event.add_participant"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to remove a participant.
#[derive(Debug, Clone)]
pub struct RemoveParticipant {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The event identifier.
    pub event_id: Uuid,
    /// The participant to remove.
    pub participant_id: Uuid,
}

impl Command for RemoveParticipant {
    fn command_type(&self) -> &'static str {
        "event.remove_participant"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to move a participant to another game.
#[derive(Debug, Clone)]
pub struct ChangeParticipantGame {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The event identifier.
    pub event_id: Uuid,
    /// The participant to move.
    pub participant_id: Uuid,
    /// The new game.
    pub game: Game,
}

impl Command for ChangeParticipantGame {
    fn command_type(&self) -> &'static str {
        "event.change_participant_game"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to start the next round.
#[derive(Debug, Clone)]
pub struct StartRound {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The event identifier.
    pub event_id: Uuid,
}

impl Command for StartRound {
    fn command_type(&self) -> &'static str {
        "event.start_round"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to finish the current round.
#[derive(Debug, Clone)]
pub struct FinishRound {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The event identifier.
    pub event_id: Uuid,
}

impl Command for FinishRound {
    fn command_type(&self) -> &'static str {
        "event.finish_round"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to finish the event and publish results.
#[derive(Debug, Clone)]
pub struct FinishEvent {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The event identifier.
    pub event_id: Uuid,
}

impl Command for FinishEvent {
    fn command_type(&self) -> &'static str {
        "event.finish_event"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to build a round's tables from table numbers.
#[derive(Debug, Clone)]
pub struct AssignTables {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The event identifier.
    pub event_id: Uuid,
    /// Zero-based round index.
    pub round_index: usize,
    /// Table number per participant.
    pub table_numbers: TableNumbers,
    /// Accept tables that differ from the nominal size.
    pub confirm_irregular_sizes: bool,
}

impl Command for AssignTables {
    fn command_type(&self) -> &'static str {
        "event.assign_tables"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to clear a round's tables and scores.
#[derive(Debug, Clone)]
pub struct ResetTables {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The event identifier.
    pub event_id: Uuid,
    /// Zero-based round index.
    pub round_index: usize,
}

impl Command for ResetTables {
    fn command_type(&self) -> &'static str {
        "event.reset_tables"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to record a score from raw input.
#[derive(Debug, Clone)]
pub struct UpdateScore {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The event identifier.
    pub event_id: Uuid,
    /// Zero-based round index.
    pub round_index: usize,
    /// The participant being scored.
    pub participant_id: Uuid,
    /// The raw input as typed.
    pub raw_value: String,
}

impl Command for UpdateScore {
    fn command_type(&self) -> &'static str {
        "event.update_score"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to return a score to unset.
#[derive(Debug, Clone)]
pub struct ClearScore {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The event identifier.
    pub event_id: Uuid,
    /// Zero-based round index.
    pub round_index: usize,
    /// The participant whose score is cleared.
    pub participant_id: Uuid,
}

impl Command for ClearScore {
    fn command_type(&self) -> &'static str {
        "event.clear_score"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
