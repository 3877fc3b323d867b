//! Property-based tests for engine invariants, exact undo and replay.

use cricket_core::invariants::{CricketInvariants, InvariantSet};
use cricket_core::{
    CLOSED, CricketGame, GameSettings, MAX_MARKS_PER_TURN, MAX_SECTORS_PER_TURN, Replay,
    ReplayStatus, Sector,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Action {
    Hit(Sector, u8),
    EndTurn,
    UndoMark,
    UndoTurn,
    CheckGameOver,
}

fn sector() -> impl Strategy<Value = Sector> {
    prop_oneof![
        4 => (15u8..=20).prop_map(Sector::Number),
        1 => Just(Sector::Bull),
        // Out of range, always refused.
        1 => Just(Sector::Number(3)),
    ]
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        12 => (sector(), 1u8..=3).prop_map(|(s, h)| Action::Hit(s, h)),
        3 => Just(Action::EndTurn),
        2 => Just(Action::UndoMark),
        1 => Just(Action::UndoTurn),
        1 => Just(Action::CheckGameOver),
    ]
}

fn new_game() -> CricketGame {
    CricketGame::new("Verano", "Invierno", GameSettings::new(20, 15, 25)).expect("Valid setup")
}

fn apply(game: &mut CricketGame, action: &Action) -> bool {
    match *action {
        Action::Hit(sector, hits) => game.apply_hits(sector, hits),
        Action::EndTurn => {
            game.end_turn();
            true
        }
        Action::UndoMark => game.undo_last_mark(),
        Action::UndoTurn => game.undo_last_turn(),
        Action::CheckGameOver => game.check_game_over(),
    }
}

fn scored_points(game: &CricketGame, player: usize) -> u32 {
    game.all_turns()
        .flatten()
        .filter(|m| m.player_index == player && m.was_scoring)
        .map(|m| m.points)
        .sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Scores always equal the points on scoring marks, and turn limits
    /// are never exceeded.
    #[test]
    fn prop_bounds_and_scores_hold(actions in prop::collection::vec(action(), 0..200)) {
        let mut game = new_game();
        for action in &actions {
            apply(&mut game, action);

            for index in 0..2 {
                prop_assert_eq!(game.player(index).score(), scored_points(&game, index));
                prop_assert!(game.player(index).sectors().iter().all(|(_, c)| c <= CLOSED));
            }
            let current = game.player(game.current_player());
            prop_assert!(current.marks_this_round() <= MAX_MARKS_PER_TURN);
            prop_assert!(current.sectors_hit_this_round().len() <= MAX_SECTORS_PER_TURN);
            prop_assert!(CricketInvariants::check_all(&game).is_ok());
        }
    }

    /// A refused hit changes nothing; an accepted hit is undone exactly.
    #[test]
    fn prop_undo_mark_inverts_hit(
        setup in prop::collection::vec(action(), 0..120),
        sector in sector(),
    ) {
        let mut game = new_game();
        for action in &setup {
            apply(&mut game, action);
        }

        let before = game.clone();
        if game.apply_hit(sector) {
            prop_assert!(game.undo_last_mark());
        }
        prop_assert_eq!(game, before);
    }

    /// Ending a turn and undoing it restores the game, rounds included.
    #[test]
    fn prop_undo_turn_inverts_end_turn(setup in prop::collection::vec(action(), 0..120)) {
        let mut game = new_game();
        for action in &setup {
            apply(&mut game, action);
        }
        prop_assume!(!game.is_game_over());

        let before = game.clone();
        game.end_turn();
        prop_assert!(game.undo_last_turn());
        prop_assert_eq!(game, before);
    }

    /// Replaying the surviving turns rebuilds the same game state.
    #[test]
    fn prop_replay_rebuilds_the_game(actions in prop::collection::vec(action(), 0..200)) {
        let mut game = new_game();
        for action in &actions {
            apply(&mut game, action);
        }

        let mut replay = Replay::new(
            game.player(0).name(),
            game.player(1).name(),
            *game.settings(),
            game.mark_history().to_vec(),
            game.current_turn().to_vec(),
        )
        .expect("Valid replay setup");

        prop_assert_eq!(replay.run_to_end(), ReplayStatus::Finished);
        let rebuilt = replay.game();
        prop_assert_eq!(rebuilt.current_player(), game.current_player());
        prop_assert_eq!(rebuilt.mark_history(), game.mark_history());
        prop_assert_eq!(rebuilt.current_turn(), game.current_turn());
        for index in 0..2 {
            let (replayed, played) = (rebuilt.player(index), game.player(index));
            prop_assert_eq!(replayed.score(), played.score());
            prop_assert_eq!(replayed.sectors(), played.sectors());
            prop_assert_eq!(replayed.rounds(), played.rounds());
            prop_assert_eq!(replayed.mpr(), played.mpr());
        }
    }
}
