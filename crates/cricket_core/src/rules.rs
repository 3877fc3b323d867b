//! Cricket rules as pure functions over player state.

use crate::action::WinnerError;
use crate::sector::{CLOSED, Sector};
use crate::types::Player;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// How a sector looks from the current player's side of the board.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum SectorState {
    /// Neither side has closed it.
    Open,
    /// Only the opponent has closed it; they can score on it.
    OpponentScoring,
    /// Only the current player has closed it; they can score on it.
    PlayerScoring,
    /// Closed by both; dead.
    Closed,
}

/// Classifies a sector from the perspective of `current` against `opponent`.
pub fn sector_state(current: &Player, opponent: &Player, sector: Sector) -> SectorState {
    match (current.is_closed(sector), opponent.is_closed(sector)) {
        (true, true) => SectorState::Closed,
        (true, false) => SectorState::PlayerScoring,
        (false, true) => SectorState::OpponentScoring,
        (false, false) => SectorState::Open,
    }
}

/// Returns true if a hit by `current` on `sector` scores.
///
/// The thrower must already have closed the sector and the opponent must
/// not have.
pub fn is_scoring_hit(current: &Player, opponent: &Player, sector: Sector) -> bool {
    current.hits(sector) >= CLOSED && opponent.hits(sector) < CLOSED
}

/// Returns true if some player has closed everything without trailing.
#[instrument(skip(players))]
pub fn has_finished(players: &[Player; 2]) -> bool {
    let top = players.iter().map(Player::score).max().unwrap_or(0);
    players.iter().any(|p| p.all_closed() && p.score() >= top)
}

/// Picks the winner of a finished game.
///
/// Higher score wins; level scores fall back to more closed sectors. Level
/// on both counts is a draw and is reported as such.
#[instrument(skip(players))]
pub fn decide_winner(players: &[Player; 2]) -> Result<usize, WinnerError> {
    let [a, b] = players;
    match a.score().cmp(&b.score()) {
        std::cmp::Ordering::Greater => Ok(0),
        std::cmp::Ordering::Less => Ok(1),
        std::cmp::Ordering::Equal => match a.closed_count().cmp(&b.closed_count()) {
            std::cmp::Ordering::Greater => Ok(0),
            std::cmp::Ordering::Less => Ok(1),
            std::cmp::Ordering::Equal => Err(WinnerError::Draw),
        },
    }
}
