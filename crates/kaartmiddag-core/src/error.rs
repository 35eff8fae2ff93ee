//! Domain error types.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An event was not found.
    #[error("event not found: {0}")]
    EventNotFound(Uuid),

    /// A participant was not found in the event or round.
    #[error("participant not found: {0}")]
    ParticipantNotFound(Uuid),

    /// A round index does not exist in the event.
    #[error("round not found: index {0}")]
    RoundNotFound(usize),

    /// A state change was attempted before its precondition holds, or a
    /// field is locked by the current status.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// Operator input failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

/// Validation failures that carry enough detail for the operator to correct
/// the input.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ValidationError {
    /// An event title was empty or only whitespace.
    #[error("title must not be empty")]
    EmptyTitle,

    /// A participant name was empty or only whitespace.
    #[error("participant name must not be empty")]
    EmptyName,

    /// Not every participant received a positive table number.
    #[error("{} participant(s) have no table number", .participant_ids.len())]
    IncompleteAssignment {
        /// Participants still lacking a table number.
        participant_ids: Vec<Uuid>,
    },

    /// Tables deviate from the nominal size and the operator has not
    /// confirmed the assignment.
    #[error(
        "{} table(s) differ from the nominal size of {nominal}; confirmation required",
        .tables.len()
    )]
    UnconfirmedTableSizes {
        /// The configured nominal table size.
        nominal: usize,
        /// The deviating tables.
        tables: Vec<TableSizeDeviation>,
    },

    /// Tables of a round are incomplete or do not sum to zero.
    #[error("round {round} cannot be finished: {}", describe_imbalances(.tables))]
    UnbalancedTables {
        /// The round number (1 or 2).
        round: u8,
        /// Every offending table.
        tables: Vec<TableImbalance>,
    },
}

/// A table whose size differs from the nominal table size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSizeDeviation {
    /// The game played at this table.
    pub game: String,
    /// The operator-entered table number.
    pub table_number: u32,
    /// How many participants were seated.
    pub size: usize,
}

/// A table that is incomplete or whose scores do not sum to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableImbalance {
    /// The table identifier.
    pub table_id: Uuid,
    /// The game played at this table.
    pub game: String,
    /// The operator-entered table number.
    pub table_number: u32,
    /// Sum of the scores entered so far.
    pub sum: i128,
    /// Seated participants without a score.
    pub missing: Vec<Uuid>,
}

fn describe_imbalances(tables: &[TableImbalance]) -> String {
    tables
        .iter()
        .map(|t| {
            if t.missing.is_empty() {
                format!("{} table {} sums to {}", t.game, t.table_number, t.sum)
            } else {
                format!(
                    "{} table {} sums to {} with {} score(s) missing",
                    t.game,
                    t.table_number,
                    t.sum,
                    t.missing.len()
                )
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}
