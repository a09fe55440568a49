//! Player type

use serde::{Deserialize, Serialize};

use crate::ids::PlayerName;
use crate::stats::{BattingStats, BowlingStats};

/// A rostered player with both sets of figures
///
/// Batting and bowling stats exist from creation, zero-valued until the
/// player bats or bowls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: PlayerName,
    pub batting: BattingStats,
    pub bowling: BowlingStats,
}

impl Player {
    pub fn new(name: impl Into<PlayerName>) -> Self {
        Self {
            name: name.into(),
            batting: BattingStats::new(),
            bowling: BowlingStats::new(),
        }
    }
}
