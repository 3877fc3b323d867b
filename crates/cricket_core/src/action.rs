//! Hit actions and the reasons the engine can refuse them.
//!
//! Rule violations are ordinary values, not failures: the caller is
//! expected to drop the input and carry on.

use crate::sector::Sector;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A request to record hits on a sector for the current player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hit {
    /// Target sector.
    pub sector: Sector,
    /// Hit count claimed by the caller, checked against the turn limit.
    pub hits: u8,
}

impl Hit {
    /// Creates a hit request.
    #[instrument]
    pub fn new(sector: Sector, hits: u8) -> Self {
        Self { sector, hits }
    }

    /// A single hit on the sector.
    pub fn single(sector: Sector) -> Self {
        Self { sector, hits: 1 }
    }
}

impl std::fmt::Display for Hit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.hits == 1 {
            write!(f, "{}", self.sector)
        } else {
            write!(f, "{} x{}", self.sector, self.hits)
        }
    }
}

/// Why a hit was not recorded. The game state is untouched in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum HitRejection {
    /// The game has already finished.
    #[display("Game is already over")]
    GameOver,

    /// A hit count of zero.
    #[display("Hit count must be at least 1")]
    NoHits,

    /// The sector is not part of this game's configuration.
    #[display("Sector {} is not in play", _0)]
    NotInPlay(Sector),

    /// Both players have closed the sector.
    #[display("Sector {} is closed by both players", _0)]
    SectorClosed(Sector),

    /// The turn would exceed nine marks.
    #[display("Turn already has {} marks, cannot add {}", recorded, requested)]
    TurnMarkLimit {
        /// Marks recorded so far this turn.
        recorded: u8,
        /// Hits requested.
        requested: u8,
    },

    /// Three distinct sectors were already touched this turn.
    #[display("Three sectors already hit this turn, {} is not one of them", _0)]
    TurnSectorLimit(Sector),
}

impl std::error::Error for HitRejection {}

/// Failure to name a winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum WinnerError {
    /// The game has not finished.
    #[display("Game is not over")]
    NotOver,

    /// Equal score and equal closed-sector count.
    #[display("Draw: scores and closed sectors are level")]
    Draw,
}

impl std::error::Error for WinnerError {}
