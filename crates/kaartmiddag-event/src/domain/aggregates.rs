//! Aggregate root for the event context.
//!
//! Every operation is pure: it validates against `&self` and either
//! returns a complete replacement `Event` or an error, never a partially
//! updated value.

use chrono::NaiveDate;
use kaartmiddag_core::clock::Clock;
use kaartmiddag_core::error::{DomainError, ValidationError};
use kaartmiddag_core::ids::IdGenerator;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EventSettings;
use crate::domain::model::{EventStatus, Game, Participant, Round};
use crate::domain::tables::{self, TableNumbers};

/// Rounds played per event.
pub const ROUND_COUNT: usize = 2;

/// The aggregate root for one kaartmiddag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    id: Uuid,
    title: String,
    date: NaiveDate,
    status: EventStatus,
    participants: Vec<Participant>,
    rounds: Vec<Round>,
}

impl Event {
    /// Creates a new event in registration.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyTitle` if the title is blank.
    pub fn create(
        title: &str,
        clock: &dyn Clock,
        ids: &dyn IdGenerator,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id: ids.next_id(),
            title: non_blank(title, ValidationError::EmptyTitle)?,
            date: clock.today(),
            status: EventStatus::Registration,
            participants: Vec::new(),
            rounds: Vec::new(),
        })
    }

    /// Event identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Calendar date the event was created on.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> EventStatus {
        self.status
    }

    /// Participants in registration order.
    #[must_use]
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Rounds started so far.
    #[must_use]
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// Looks up a participant.
    #[must_use]
    pub fn participant(&self, participant_id: Uuid) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == participant_id)
    }

    /// Looks up a round by zero-based index.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::RoundNotFound` for an unknown index.
    pub fn round(&self, index: usize) -> Result<&Round, DomainError> {
        self.rounds.get(index).ok_or(DomainError::RoundNotFound(index))
    }

    /// Renames the event. Allowed at any status.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyTitle` if the title is blank.
    pub fn rename(&self, title: &str) -> Result<Self, DomainError> {
        let title = non_blank(title, ValidationError::EmptyTitle)?;
        Ok(Self {
            title,
            ..self.clone()
        })
    }

    /// Registers a participant for a game.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyName` for a blank name and
    /// `DomainError::InvalidTransition` once results are final.
    pub fn add_participant(
        &self,
        name: &str,
        game: Game,
        ids: &dyn IdGenerator,
    ) -> Result<Self, DomainError> {
        self.ensure_open("add participants")?;
        let name = non_blank(name, ValidationError::EmptyName)?;
        let mut next = self.clone();
        next.participants.push(Participant {
            id: ids.next_id(),
            name,
            game,
        });
        Ok(next)
    }

    /// Removes a participant. An unknown id leaves the event unchanged.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if the participant is seated
    /// at a table or results are final.
    pub fn remove_participant(&self, participant_id: Uuid) -> Result<Self, DomainError> {
        if self.participant(participant_id).is_none() {
            return Ok(self.clone());
        }
        self.ensure_open("remove participants")?;
        if self.is_seated(participant_id) {
            return Err(DomainError::InvalidTransition(format!(
                "participant {participant_id} is seated at a table; reset the tables first"
            )));
        }
        let mut next = self.clone();
        next.participants.retain(|p| p.id != participant_id);
        Ok(next)
    }

    /// Moves a participant to the other game.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ParticipantNotFound` for an unknown id, and
    /// `DomainError::InvalidTransition` once the participant has been seated
    /// or results are final.
    pub fn change_participant_game(
        &self,
        participant_id: Uuid,
        game: Game,
    ) -> Result<Self, DomainError> {
        let current = self
            .participant(participant_id)
            .ok_or(DomainError::ParticipantNotFound(participant_id))?;
        if current.game == game {
            return Ok(self.clone());
        }
        self.ensure_open("change games")?;
        if self.is_seated(participant_id) {
            return Err(DomainError::InvalidTransition(format!(
                "participant {participant_id} is already seated; tables are built per game"
            )));
        }
        let mut next = self.clone();
        for participant in &mut next.participants {
            if participant.id == participant_id {
                participant.game = game;
            }
        }
        Ok(next)
    }

    /// Starts the next round: registration to round 1, round 1 to round 2.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless the current round (if
    /// any) is finished and balanced, or when both rounds have started.
    pub fn start_round(&self) -> Result<Self, DomainError> {
        match self.status {
            EventStatus::Registration => {}
            EventStatus::Round1 => {
                let current = self.current_round()?;
                if !current.finished {
                    return Err(DomainError::InvalidTransition(format!(
                        "round {} must be finished before the next round starts",
                        current.number
                    )));
                }
                current
                    .check_balanced()
                    .map_err(|e| DomainError::InvalidTransition(e.to_string()))?;
            }
            EventStatus::Round2 | EventStatus::Results => {
                return Err(DomainError::InvalidTransition(format!(
                    "no round can start during {}",
                    self.status
                )));
            }
        }

        if self.rounds.len() >= ROUND_COUNT {
            return Err(DomainError::InvalidTransition(format!(
                "all {ROUND_COUNT} rounds have already started"
            )));
        }

        let mut next = self.clone();
        let number = u8::try_from(self.rounds.len() + 1)
            .map_err(|_| DomainError::InvalidTransition("too many rounds".to_owned()))?;
        next.rounds.push(Round::new(number));
        next.status = self.advanced_status()?;
        Ok(next)
    }

    /// Marks the current round finished. The status does not change; the
    /// next round is opened by [`Event::start_round`].
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnbalancedTables` naming every incomplete or
    /// non-zero table, and `DomainError::InvalidTransition` outside a round or
    /// when no tables were assigned.
    pub fn finish_round(&self) -> Result<Self, DomainError> {
        if !matches!(self.status, EventStatus::Round1 | EventStatus::Round2) {
            return Err(DomainError::InvalidTransition(format!(
                "there is no round to finish during {}",
                self.status
            )));
        }
        let index = self.rounds.len().saturating_sub(1);
        self.ensure_finishable(self.current_round()?)?;
        let mut next = self.clone();
        next.rounds[index].finished = true;
        Ok(next)
    }

    /// Finishes the event: verifies every round and moves to results.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless round 2 is in play, and
    /// `ValidationError::UnbalancedTables` for the first round that fails the
    /// balance check.
    pub fn finish_event(&self) -> Result<Self, DomainError> {
        if self.status != EventStatus::Round2 {
            return Err(DomainError::InvalidTransition(format!(
                "the event can only be finished from round 2, not {}",
                self.status
            )));
        }
        for round in &self.rounds {
            self.ensure_finishable(round)?;
        }
        let mut next = self.clone();
        for round in &mut next.rounds {
            round.finished = true;
        }
        next.status = self.advanced_status()?;
        Ok(next)
    }

    /// Replaces a round's tables with the groups built from `numbers`.
    ///
    /// Scores of participants who are no longer seated are dropped.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::IncompleteAssignment` if a participant lacks
    /// a table number, `ValidationError::UnconfirmedTableSizes` if sizes
    /// deviate and `confirmed` is false, `DomainError::RoundNotFound` for an
    /// unknown index and `DomainError::InvalidTransition` for a finished round.
    pub fn assign_tables(
        &self,
        round_index: usize,
        numbers: &TableNumbers,
        settings: &EventSettings,
        confirmed: bool,
        ids: &dyn IdGenerator,
    ) -> Result<Self, DomainError> {
        self.ensure_open("assign tables")?;
        let round = self.round(round_index)?;
        if round.finished {
            return Err(DomainError::InvalidTransition(format!(
                "round {} is finished; reset its tables first",
                round.number
            )));
        }

        let plan = tables::build_tables(&self.participants, numbers, settings, ids)?;
        if !plan.deviations.is_empty() && !confirmed {
            return Err(ValidationError::UnconfirmedTableSizes {
                nominal: settings.nominal_table_size().unwrap_or_default(),
                tables: plan.deviations,
            }
            .into());
        }

        let mut replacement = round.clone();
        replacement.tables = plan.tables;
        replacement
            .scores
            .retain(|id, _| replacement.tables.iter().any(|t| t.seats(*id)));
        Ok(self.with_round(round_index, replacement))
    }

    /// Clears a round's tables and scores. An operator correction, not a
    /// status change.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::RoundNotFound` for an unknown index and
    /// `DomainError::InvalidTransition` once results are final.
    pub fn reset_tables(&self, round_index: usize) -> Result<Self, DomainError> {
        self.ensure_open("reset tables")?;
        let number = self.round(round_index)?.number;
        Ok(self.with_round(round_index, Round::new(number)))
    }

    /// Records a score from raw operator input. See [`Round::update_score`].
    ///
    /// # Errors
    ///
    /// Returns `DomainError::RoundNotFound`, `DomainError::ParticipantNotFound`
    /// or `DomainError::InvalidTransition` as described on the round method.
    pub fn update_score(
        &self,
        round_index: usize,
        participant_id: Uuid,
        raw: &str,
    ) -> Result<Self, DomainError> {
        self.ensure_open("change scores")?;
        let round = self.round(round_index)?.update_score(participant_id, raw)?;
        Ok(self.with_round(round_index, round))
    }

    /// Returns a score to "unset".
    ///
    /// # Errors
    ///
    /// Same as [`Event::update_score`].
    pub fn clear_score(
        &self,
        round_index: usize,
        participant_id: Uuid,
    ) -> Result<Self, DomainError> {
        self.ensure_open("change scores")?;
        let round = self.round(round_index)?.clear_score(participant_id)?;
        Ok(self.with_round(round_index, round))
    }

    fn is_seated(&self, participant_id: Uuid) -> bool {
        self.rounds
            .iter()
            .any(|r| r.table_of(participant_id).is_some())
    }

    fn current_round(&self) -> Result<&Round, DomainError> {
        self.rounds.last().ok_or_else(|| {
            DomainError::InvalidTransition(format!("no round has started during {}", self.status))
        })
    }

    fn advanced_status(&self) -> Result<EventStatus, DomainError> {
        self.status.next().ok_or_else(|| {
            DomainError::InvalidTransition(format!("{} is the final status", self.status))
        })
    }

    fn ensure_open(&self, action: &str) -> Result<(), DomainError> {
        if self.status == EventStatus::Results {
            return Err(DomainError::InvalidTransition(format!(
                "cannot {action}: results are final"
            )));
        }
        Ok(())
    }

    fn ensure_finishable(&self, round: &Round) -> Result<(), DomainError> {
        if round.tables.is_empty() && !self.participants.is_empty() {
            return Err(DomainError::InvalidTransition(format!(
                "round {} has no tables assigned",
                round.number
            )));
        }
        round.check_balanced()?;
        Ok(())
    }

    fn with_round(&self, index: usize, round: Round) -> Self {
        let mut next = self.clone();
        next.rounds[index] = round;
        next
    }
}

fn non_blank(value: &str, error: ValidationError) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(error.into());
    }
    Ok(trimmed.to_owned())
}
