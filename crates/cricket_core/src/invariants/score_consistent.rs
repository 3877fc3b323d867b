//! Score consistency invariant: scores are exactly the sum of scored marks.

use super::Invariant;
use crate::CricketGame;

/// Invariant: each player's score equals the points on their marks, and
/// only scoring marks carry points.
pub struct ScoreConsistentInvariant;

impl Invariant<CricketGame> for ScoreConsistentInvariant {
    fn holds(game: &CricketGame) -> bool {
        let mut totals = [0u64; 2];
        for mark in game.all_turns().flatten() {
            if mark.was_scoring != (mark.points > 0) {
                return false;
            }
            totals[mark.player_index] += u64::from(mark.points);
        }
        game.players()
            .iter()
            .zip(totals)
            .all(|(player, total)| u64::from(player.score()) == total)
    }

    fn description() -> &'static str {
        "Score equals the sum of points over the player's marks"
    }
}
