//! Final ranking per game with prize classification.
//!
//! Pure read-only views: nothing here mutates an event, and a missing score
//! counts as 0 rather than blocking the ranking.

use serde::Serialize;
use uuid::Uuid;

use crate::config::EventSettings;
use crate::domain::aggregates::Event;
use crate::domain::model::Game;

/// One participant's line in the ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    /// 1-based rank within the game.
    pub position: usize,
    /// The participant.
    pub participant_id: Uuid,
    /// Display name.
    pub name: String,
    /// Score per round, 0 where no score was entered.
    pub round_scores: Vec<i64>,
    /// Sum over all rounds, widened so it cannot overflow.
    pub total: i128,
    /// Total is strictly positive.
    pub has_positive_prize: bool,
    /// Total equals the lowest total of the game (poedelprijs).
    pub is_poedel_prize: bool,
}

/// Ranking of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStandings {
    /// The game.
    pub game: Game,
    /// Participants ordered by descending total.
    pub standings: Vec<Standing>,
}

/// Ranks the participants of one game by descending total. Ties keep
/// registration order.
#[must_use]
pub fn rank_game(event: &Event, game: Game) -> Vec<Standing> {
    let mut lines: Vec<Standing> = event
        .participants()
        .iter()
        .filter(|p| p.game == game)
        .map(|p| {
            let round_scores: Vec<i64> = event
                .rounds()
                .iter()
                .map(|r| r.score(p.id).unwrap_or(0))
                .collect();
            Standing {
                position: 0,
                participant_id: p.id,
                name: p.name.clone(),
                total: round_scores.iter().copied().map(i128::from).sum(),
                round_scores,
                has_positive_prize: false,
                is_poedel_prize: false,
            }
        })
        .collect();

    lines.sort_by(|a, b| b.total.cmp(&a.total));

    let Some(minimum) = lines.iter().map(|s| s.total).min() else {
        return lines;
    };
    for (index, line) in lines.iter_mut().enumerate() {
        line.position = index + 1;
        line.has_positive_prize = line.total > 0;
        line.is_poedel_prize = line.total == minimum;
    }
    lines
}

/// Rankings for both games, in the configured game order.
#[must_use]
pub fn standings(event: &Event, settings: &EventSettings) -> Vec<GameStandings> {
    settings
        .game_order()
        .into_iter()
        .map(|game| GameStandings {
            game,
            standings: rank_game(event, game),
        })
        .collect()
}
