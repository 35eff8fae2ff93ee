//! Table assignment: turns per-participant table numbers into tables.
//!
//! Table numbers are scoped per game, so table 1 of Jokeren and table 1 of
//! Rikken are unrelated groups.

use std::collections::{BTreeMap, HashMap};

use kaartmiddag_core::error::{DomainError, TableSizeDeviation, ValidationError};
use kaartmiddag_core::ids::IdGenerator;
use uuid::Uuid;

use crate::config::EventSettings;
use crate::domain::model::{Game, Participant, Table};

/// Operator input: table number per participant id. Zero means unassigned.
pub type TableNumbers = HashMap<Uuid, u32>;

/// Validated tables plus any size deviations the operator must confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePlan {
    /// Tables ordered by configured game order, then ascending number.
    pub tables: Vec<Table>,
    /// Tables whose size differs from the nominal size.
    pub deviations: Vec<TableSizeDeviation>,
}

/// Parses a raw table number. Anything that is not a positive integer is
/// treated as unassigned.
#[must_use]
pub fn parse_table_number(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

/// Groups every participant by `(game, table number)`.
///
/// Entries in `numbers` for ids that are not participants are ignored.
///
/// # Errors
///
/// Returns `ValidationError::IncompleteAssignment` naming every participant
/// without a positive table number.
pub fn build_tables(
    participants: &[Participant],
    numbers: &TableNumbers,
    settings: &EventSettings,
    ids: &dyn IdGenerator,
) -> Result<TablePlan, DomainError> {
    let mut missing = Vec::new();
    let mut groups: BTreeMap<(usize, u32), (Game, Vec<Uuid>)> = BTreeMap::new();

    for participant in participants {
        match numbers.get(&participant.id).copied().filter(|n| *n > 0) {
            Some(number) => {
                groups
                    .entry((settings.game_rank(participant.game), number))
                    .or_insert_with(|| (participant.game, Vec::new()))
                    .1
                    .push(participant.id);
            }
            None => missing.push(participant.id),
        }
    }

    if !missing.is_empty() {
        return Err(ValidationError::IncompleteAssignment {
            participant_ids: missing,
        }
        .into());
    }

    let tables: Vec<Table> = groups
        .into_iter()
        .map(|((_, number), (game, participant_ids))| Table {
            id: ids.next_id(),
            number,
            game,
            participant_ids,
        })
        .collect();

    let deviations = settings
        .nominal_table_size()
        .map(|nominal| size_deviations(&tables, nominal))
        .unwrap_or_default();

    Ok(TablePlan { tables, deviations })
}

fn size_deviations(tables: &[Table], nominal: usize) -> Vec<TableSizeDeviation> {
    tables
        .iter()
        .filter(|t| t.participant_ids.len() != nominal)
        .map(|t| TableSizeDeviation {
            game: t.game.to_string(),
            table_number: t.number,
            size: t.participant_ids.len(),
        })
        .collect()
}
