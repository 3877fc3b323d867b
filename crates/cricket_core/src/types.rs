//! Core domain types for cricket: players and the mark log.

use crate::sector::{CLOSED, GameSettings, Sector, SectorTally};
use serde::{Deserialize, Serialize};

/// Most marks a player may record in one turn.
pub const MAX_MARKS_PER_TURN: u8 = 9;

/// Most distinct sectors a player may touch in one turn.
pub const MAX_SECTORS_PER_TURN: usize = 3;

/// A single recorded hit.
///
/// Marks are immutable log entries. They carry everything needed to undo
/// the hit exactly and to replay it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mark {
    /// Index of the player who threw.
    #[serde(rename = "player")]
    pub player_index: usize,
    /// Sector that was hit.
    pub sector: Sector,
    /// True if the hit produced points.
    pub was_scoring: bool,
    /// Points awarded (zero unless scoring).
    pub points: u32,
}

/// Per-player state.
///
/// Per-turn counters are only meaningful for the player whose turn it is;
/// the waiting player's counters are always zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub(crate) name: String,
    pub(crate) score: u32,
    pub(crate) sectors: SectorTally,
    pub(crate) marks_this_round: u8,
    pub(crate) turn_hits: SectorTally,
    pub(crate) rounds: u32,
}

impl Player {
    pub(crate) fn new(name: String, settings: &GameSettings) -> Self {
        Self {
            name,
            score: 0,
            sectors: SectorTally::new(settings),
            marks_this_round: 0,
            turn_hits: SectorTally::new(settings),
            rounds: 1,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current score.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Hit counts for every configured sector.
    pub fn sectors(&self) -> &SectorTally {
        &self.sectors
    }

    /// Hit count on one sector, `0..=3`.
    pub fn hits(&self, sector: Sector) -> u8 {
        self.sectors.get(sector)
    }

    /// Returns true if the player has closed the sector.
    pub fn is_closed(&self, sector: Sector) -> bool {
        self.hits(sector) >= CLOSED
    }

    /// Number of closed sectors.
    pub fn closed_count(&self) -> usize {
        self.sectors.iter().filter(|(_, c)| *c >= CLOSED).count()
    }

    /// Returns true once every configured sector is closed.
    pub fn all_closed(&self) -> bool {
        self.sectors.iter().all(|(_, c)| c >= CLOSED)
    }

    /// Marks recorded in the current turn.
    pub fn marks_this_round(&self) -> u8 {
        self.marks_this_round
    }

    /// Hits on a sector during the current turn.
    pub fn turn_hits(&self, sector: Sector) -> u8 {
        self.turn_hits.get(sector)
    }

    /// Distinct sectors touched this turn.
    pub fn sectors_hit_this_round(&self) -> Vec<Sector> {
        self.turn_hits.touched()
    }

    /// Turns this player has completed, starting at 1.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Marks per round: total sector hits divided by rounds.
    pub fn mpr(&self) -> f64 {
        f64::from(self.sectors.total()) / f64::from(self.rounds.max(1))
    }

    pub(crate) fn reset_turn(&mut self) {
        self.marks_this_round = 0;
        self.turn_hits.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_is_blank() {
        let player = Player::new("Verano".to_string(), &GameSettings::default());
        assert_eq!(player.name(), "Verano");
        assert_eq!(player.score(), 0);
        assert_eq!(player.rounds(), 1);
        assert_eq!(player.mpr(), 0.0);
        assert_eq!(player.closed_count(), 0);
        assert!(!player.all_closed());
        assert!(player.sectors_hit_this_round().is_empty());
    }

    #[test]
    fn test_mpr_divides_by_rounds() {
        let mut player = Player::new("Invierno".to_string(), &GameSettings::default());
        player.sectors.increment(Sector::Number(20));
        player.sectors.increment(Sector::Number(20));
        player.sectors.increment(Sector::Bull);
        player.rounds = 2;
        assert_eq!(player.mpr(), 1.5);
    }

    #[test]
    fn test_mark_uses_record_field_names() {
        let mark = Mark {
            player_index: 1,
            sector: Sector::Bull,
            was_scoring: true,
            points: 25,
        };
        let json = serde_json::to_value(mark).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"player": 1, "sector": "Bull", "was_scoring": true, "points": 25})
        );
    }
}
