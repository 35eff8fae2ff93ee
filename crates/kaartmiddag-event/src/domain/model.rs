//! Value types owned by an event: games, statuses, participants, rounds
//! and tables.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The two card games played at a kaartmiddag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Game {
    /// Jokeren.
    Jokeren,
    /// Rikken.
    Rikken,
}

impl Game {
    /// Both games, in declaration order.
    pub const ALL: [Game; 2] = [Game::Jokeren, Game::Rikken];

    /// Returns the game name as stored and displayed.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Game::Jokeren => "Jokeren",
            Game::Rikken => "Rikken",
        }
    }

    /// Returns the other game.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Game::Jokeren => Game::Rikken,
            Game::Rikken => Game::Jokeren,
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a game name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown game: {0}")]
pub struct ParseGameError(pub String);

impl FromStr for Game {
    type Err = ParseGameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Game::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseGameError(trimmed.to_owned()))
    }
}

/// Stage of an event. The derived ordering is the only order in which an
/// event may move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// Participants are being registered.
    Registration,
    /// The first round is being played.
    Round1,
    /// The second round is being played.
    Round2,
    /// Final ranking. Terminal.
    Results,
}

impl EventStatus {
    /// Returns the status that follows this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            EventStatus::Registration => Some(EventStatus::Round1),
            EventStatus::Round1 => Some(EventStatus::Round2),
            EventStatus::Round2 => Some(EventStatus::Results),
            EventStatus::Results => None,
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventStatus::Registration => "registration",
            EventStatus::Round1 => "round 1",
            EventStatus::Round2 => "round 2",
            EventStatus::Results => "results",
        };
        f.write_str(label)
    }
}

/// A registered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Identifier, unique within the event for its lifetime.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// The game this participant plays.
    pub game: Game,
}

/// A group of participants of one game playing together in one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Generated identifier.
    pub id: Uuid,
    /// Operator-entered table number, scoped per game.
    pub number: u32,
    /// The game played at this table.
    pub game: Game,
    /// Seated participants, in registration order.
    pub participant_ids: Vec<Uuid>,
}

impl Table {
    /// Whether the participant is seated at this table.
    #[must_use]
    pub fn seats(&self, participant_id: Uuid) -> bool {
        self.participant_ids.contains(&participant_id)
    }
}

/// One cycle of table assignment, play and scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    /// Round number, 1 or 2.
    pub number: u8,
    /// Tables for this round; empty until assigned.
    pub tables: Vec<Table>,
    /// Entered scores. A missing key means "unset", distinct from 0.
    pub scores: BTreeMap<Uuid, i64>,
    /// Set once every table was verified complete and balanced.
    #[serde(default)]
    pub finished: bool,
}

impl Round {
    /// Creates an empty, unfinished round.
    #[must_use]
    pub fn new(number: u8) -> Self {
        Self {
            number,
            tables: Vec::new(),
            scores: BTreeMap::new(),
            finished: false,
        }
    }

    /// Returns the table the participant is seated at, if any.
    #[must_use]
    pub fn table_of(&self, participant_id: Uuid) -> Option<&Table> {
        self.tables.iter().find(|t| t.seats(participant_id))
    }

    /// Returns the stored score, or `None` when unset.
    #[must_use]
    pub fn score(&self, participant_id: Uuid) -> Option<i64> {
        self.scores.get(&participant_id).copied()
    }
}
