//! Sector bounds invariant: no player has more than three hits on a sector.

use super::Invariant;
use crate::CricketGame;
use crate::sector::CLOSED;

/// Invariant: every hit count is within `0..=3`.
pub struct SectorBoundsInvariant;

impl Invariant<CricketGame> for SectorBoundsInvariant {
    fn holds(game: &CricketGame) -> bool {
        game.players()
            .iter()
            .all(|p| p.sectors().iter().all(|(_, hits)| hits <= CLOSED))
    }

    fn description() -> &'static str {
        "Every sector hit count is at most 3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameSettings, Sector};

    #[test]
    fn test_closing_and_scoring_holds() {
        let mut game = CricketGame::new("A", "B", GameSettings::default()).unwrap();
        for _ in 0..6 {
            game.apply_hit(Sector::Number(17));
        }
        assert_eq!(game.player(0).hits(Sector::Number(17)), 3);
        assert!(SectorBoundsInvariant::holds(&game));
    }

    #[test]
    fn test_overfilled_sector_violates() {
        let mut game = CricketGame::new("A", "B", GameSettings::default()).unwrap();
        for _ in 0..4 {
            game.players_mut()[0].sectors.increment(Sector::Bull);
        }
        assert!(!SectorBoundsInvariant::holds(&game));
    }
}
