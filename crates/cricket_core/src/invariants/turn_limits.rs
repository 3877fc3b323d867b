//! Turn limits invariant: per-turn bookkeeping stays within the rules.

use super::Invariant;
use crate::CricketGame;
use crate::types::{MAX_MARKS_PER_TURN, MAX_SECTORS_PER_TURN};

/// Invariant: the thrower has at most nine marks on at most three sectors,
/// matching the open turn, and the waiting player has no per-turn state.
pub struct TurnLimitsInvariant;

impl Invariant<CricketGame> for TurnLimitsInvariant {
    fn holds(game: &CricketGame) -> bool {
        let current = game.player(game.current_player());
        let waiting = game.player(game.opponent_index());

        current.marks_this_round() <= MAX_MARKS_PER_TURN
            && current.sectors_hit_this_round().len() <= MAX_SECTORS_PER_TURN
            && usize::from(current.marks_this_round()) == game.current_turn().len()
            && waiting.marks_this_round() == 0
            && waiting.sectors_hit_this_round().is_empty()
    }

    fn description() -> &'static str {
        "Turn has at most 9 marks on at most 3 sectors and matches the open turn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameSettings, Sector};

    #[test]
    fn test_full_turn_holds() {
        let mut game = CricketGame::new("A", "B", GameSettings::default()).unwrap();
        for sector in [Sector::Number(20), Sector::Number(19), Sector::Bull] {
            for _ in 0..3 {
                assert!(game.apply_hit(sector));
            }
        }
        assert!(TurnLimitsInvariant::holds(&game));
        game.end_turn();
        assert!(TurnLimitsInvariant::holds(&game));
    }

    #[test]
    fn test_stale_waiting_counters_violate() {
        let mut game = CricketGame::new("A", "B", GameSettings::default()).unwrap();
        game.players_mut()[1].turn_hits.increment(Sector::Number(15));
        assert!(!TurnLimitsInvariant::holds(&game));
    }
}
