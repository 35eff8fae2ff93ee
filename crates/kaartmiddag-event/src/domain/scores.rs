//! Score ledger and zero-sum balance checks for a round.

use kaartmiddag_core::error::{DomainError, TableImbalance, ValidationError};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::model::{Game, Round, Table};

/// Interpretation of a raw score entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreInput {
    /// A complete integer.
    Value(i64),
    /// A lone sign character while the operator is still typing. Stored as 0.
    Pending,
    /// Not a number. The previous value is kept.
    Invalid,
}

/// Parses a raw score entry.
#[must_use]
pub fn parse_score(raw: &str) -> ScoreInput {
    let trimmed = raw.trim();
    if trimmed == "-" || trimmed == "+" {
        return ScoreInput::Pending;
    }
    trimmed.parse::<i64>().map_or(ScoreInput::Invalid, ScoreInput::Value)
}

/// Score state of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableBalance {
    /// The table identifier.
    pub table_id: Uuid,
    /// Operator-entered table number.
    pub number: u32,
    /// The game played at the table.
    pub game: Game,
    /// Sum of the scores entered so far, widened so it cannot overflow.
    pub sum: i128,
    /// Seated participants without a score.
    pub missing: Vec<Uuid>,
}

impl TableBalance {
    /// Every seated participant has a score.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Complete and summing to exactly zero.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.is_complete() && self.sum == 0
    }

    fn to_imbalance(&self) -> TableImbalance {
        TableImbalance {
            table_id: self.table_id,
            game: self.game.to_string(),
            table_number: self.number,
            sum: self.sum,
            missing: self.missing.clone(),
        }
    }
}

impl Round {
    /// Records a score from raw operator input.
    ///
    /// A lone sign stores 0; non-numeric input keeps the previous value.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ParticipantNotFound` if the participant is not
    /// seated in this round, or `DomainError::InvalidTransition` if the round
    /// is finished.
    pub fn update_score(&self, participant_id: Uuid, raw: &str) -> Result<Self, DomainError> {
        self.ensure_scorable(participant_id)?;
        let mut next = self.clone();
        match parse_score(raw) {
            ScoreInput::Value(value) => {
                next.scores.insert(participant_id, value);
            }
            ScoreInput::Pending => {
                next.scores.insert(participant_id, 0);
            }
            ScoreInput::Invalid => {}
        }
        Ok(next)
    }

    /// Returns a participant's score to "unset".
    ///
    /// # Errors
    ///
    /// Same as [`Round::update_score`].
    pub fn clear_score(&self, participant_id: Uuid) -> Result<Self, DomainError> {
        self.ensure_scorable(participant_id)?;
        let mut next = self.clone();
        next.scores.remove(&participant_id);
        Ok(next)
    }

    /// Balance of every table, in table order.
    #[must_use]
    pub fn balance(&self) -> Vec<TableBalance> {
        self.tables.iter().map(|t| self.table_balance(t)).collect()
    }

    /// Verifies that every table is complete and sums to zero.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnbalancedTables` listing every offending
    /// table with its current sum.
    pub fn check_balanced(&self) -> Result<(), ValidationError> {
        let tables: Vec<TableImbalance> = self
            .balance()
            .iter()
            .filter(|b| !b.is_balanced())
            .map(TableBalance::to_imbalance)
            .collect();
        if tables.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::UnbalancedTables {
                round: self.number,
                tables,
            })
        }
    }

    fn table_balance(&self, table: &Table) -> TableBalance {
        let mut sum: i128 = 0;
        let mut missing = Vec::new();
        for id in &table.participant_ids {
            match self.score(*id) {
                Some(score) => sum += i128::from(score),
                None => missing.push(*id),
            }
        }
        TableBalance {
            table_id: table.id,
            number: table.number,
            game: table.game,
            sum,
            missing,
        }
    }

    fn ensure_scorable(&self, participant_id: Uuid) -> Result<(), DomainError> {
        if self.finished {
            return Err(DomainError::InvalidTransition(format!(
                "round {} is finished; reset its tables to change scores",
                self.number
            )));
        }
        if self.table_of(participant_id).is_none() {
            return Err(DomainError::ParticipantNotFound(participant_id));
        }
        Ok(())
    }
}
