//! Policy settings for the event context.

use crate::domain::model::Game;

/// Nominal number of participants per table.
pub const DEFAULT_NOMINAL_TABLE_SIZE: usize = 4;

/// Tunable policy for table assignment and result presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSettings {
    nominal_table_size: Option<usize>,
    game_order: [Game; 2],
}

impl EventSettings {
    /// Creates settings. A nominal size of `None` or `Some(0)` disables the
    /// table size warning; `first_game` lists that game's tables and
    /// standings before the other's.
    #[must_use]
    pub fn new(nominal_table_size: Option<usize>, first_game: Game) -> Self {
        Self {
            nominal_table_size: nominal_table_size.filter(|n| *n > 0),
            game_order: [first_game, first_game.other()],
        }
    }

    /// The nominal table size, if the size check is enabled.
    #[must_use]
    pub fn nominal_table_size(&self) -> Option<usize> {
        self.nominal_table_size
    }

    /// Both games, in presentation order.
    #[must_use]
    pub fn game_order(&self) -> [Game; 2] {
        self.game_order
    }

    /// Position of `game` in the presentation order.
    #[must_use]
    pub fn game_rank(&self, game: Game) -> usize {
        usize::from(self.game_order[0] != game)
    }
}

impl Default for EventSettings {
    fn default() -> Self {
        Self::new(Some(DEFAULT_NOMINAL_TABLE_SIZE), Game::Jokeren)
    }
}
