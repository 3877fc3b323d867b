//! The cricket game engine.
//!
//! `CricketGame` owns both players, the turn sequence and the mark log.
//! Every mutation goes through [`CricketGame::try_apply_hit`],
//! [`CricketGame::end_turn`] or one of the undo operations, and each of
//! those is an exact inverse of another.

use crate::action::{Hit, HitRejection, WinnerError};
use crate::invariants::{CricketInvariants, InvariantSet};
use crate::rules::{self, SectorState};
use crate::sector::{CLOSED, GameSettings, Sector, SetupError};
use crate::types::{MAX_MARKS_PER_TURN, MAX_SECTORS_PER_TURN, Mark, Player};
use tracing::{debug, error, info, instrument};

/// Two-player cricket game.
#[derive(Debug, Clone, PartialEq)]
pub struct CricketGame {
    players: [Player; 2],
    current_player: usize,
    settings: GameSettings,
    game_over: bool,
    mark_history: Vec<Vec<Mark>>,
    current_turn: Vec<Mark>,
}

impl CricketGame {
    /// Creates a game between two named players.
    ///
    /// Player 0 throws first.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] if a name is blank or the settings are invalid.
    #[instrument(skip(name1, name2), fields(player1 = %name1.as_ref(), player2 = %name2.as_ref()))]
    pub fn new(
        name1: impl AsRef<str>,
        name2: impl AsRef<str>,
        settings: GameSettings,
    ) -> Result<Self, SetupError> {
        settings.validate()?;
        let names = [name1.as_ref().trim(), name2.as_ref().trim()];
        if let Some(index) = names.iter().position(|n| n.is_empty()) {
            return Err(SetupError::EmptyName { index });
        }

        info!(?settings, "Starting new cricket game");
        Ok(Self {
            players: names.map(|n| Player::new(n.to_string(), &settings)),
            current_player: 0,
            settings,
            game_over: false,
            mark_history: Vec::new(),
            current_turn: Vec::new(),
        })
    }

    /// Both players, index 0 and 1.
    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    /// One player by index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not 0 or 1.
    pub fn player(&self, index: usize) -> &Player {
        &self.players[index]
    }

    /// Index of the player whose turn it is.
    pub fn current_player(&self) -> usize {
        self.current_player
    }

    /// Index of the waiting player.
    pub fn opponent_index(&self) -> usize {
        1 - self.current_player
    }

    /// Sector configuration.
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// True once the game has been found finished.
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Completed turns, oldest first.
    pub fn mark_history(&self) -> &[Vec<Mark>] {
        &self.mark_history
    }

    /// Marks of the turn in progress.
    pub fn current_turn(&self) -> &[Mark] {
        &self.current_turn
    }

    /// Every turn, completed ones followed by the open one.
    pub fn all_turns(&self) -> impl Iterator<Item = &[Mark]> {
        self.mark_history
            .iter()
            .map(Vec::as_slice)
            .chain(std::iter::once(self.current_turn.as_slice()))
    }

    /// Records a single hit on `sector`. Returns false if it was refused.
    pub fn apply_hit(&mut self, sector: Sector) -> bool {
        self.apply_hits(sector, 1)
    }

    /// Records a hit on `sector`, checking `hits` against the turn limit.
    ///
    /// Returns false, leaving the game untouched, if the hit was refused.
    pub fn apply_hits(&mut self, sector: Sector, hits: u8) -> bool {
        match self.try_apply_hit(Hit::new(sector, hits)) {
            Ok(_) => true,
            Err(reason) => {
                debug!(%reason, "Hit ignored");
                false
            }
        }
    }

    /// Records a hit and returns the resulting mark, or the reason it was
    /// refused.
    ///
    /// Only one mark is recorded per call. A hit on a sector the thrower
    /// has not yet closed moves it one step towards closed; a hit on a
    /// sector the thrower has closed scores unless the opponent has closed
    /// it too.
    ///
    /// # Errors
    ///
    /// Returns [`HitRejection`] when the game is over, the sector is not in
    /// play or dead, or the turn's mark or sector budget is spent.
    #[instrument(skip(self), fields(player = self.current_player, %hit))]
    pub fn try_apply_hit(&mut self, hit: Hit) -> Result<Mark, HitRejection> {
        let Hit { sector, hits } = hit;
        if self.game_over {
            return Err(HitRejection::GameOver);
        }
        if hits == 0 {
            return Err(HitRejection::NoHits);
        }
        if !self.settings.contains(sector) {
            return Err(HitRejection::NotInPlay(sector));
        }

        let me = self.current_player;
        let thrower = &self.players[me];
        let opponent = &self.players[1 - me];
        if thrower.is_closed(sector) && opponent.is_closed(sector) {
            return Err(HitRejection::SectorClosed(sector));
        }
        if u16::from(thrower.marks_this_round) + u16::from(hits) > u16::from(MAX_MARKS_PER_TURN) {
            return Err(HitRejection::TurnMarkLimit {
                recorded: thrower.marks_this_round,
                requested: hits,
            });
        }
        if thrower.turn_hits(sector) == 0
            && thrower.sectors_hit_this_round().len() >= MAX_SECTORS_PER_TURN
        {
            return Err(HitRejection::TurnSectorLimit(sector));
        }

        let was_scoring = rules::is_scoring_hit(thrower, opponent, sector);
        let mark = Mark {
            player_index: me,
            sector,
            was_scoring,
            points: if was_scoring {
                self.settings.points(sector)
            } else {
                0
            },
        };
        self.current_turn.push(mark);

        let thrower = &mut self.players[me];
        if thrower.hits(sector) < CLOSED {
            thrower.sectors.increment(sector);
        } else {
            thrower.score += mark.points;
        }
        thrower.marks_this_round += 1;
        thrower.turn_hits.increment(sector);

        debug!(
            was_scoring,
            points = mark.points,
            hits = thrower.hits(sector),
            score = thrower.score,
            "Hit recorded"
        );
        self.debug_check_invariants();
        Ok(mark)
    }

    /// Ends the current turn and hands the board to the other player.
    ///
    /// Works on an empty turn too. The finished turn moves into the
    /// history and is never touched again except by [`Self::undo_last_turn`].
    #[instrument(skip(self), fields(player = self.current_player, marks = self.current_turn.len()))]
    pub fn end_turn(&mut self) {
        let departing = self.current_player;
        let turn = std::mem::take(&mut self.current_turn);
        self.mark_history.push(turn);

        let player = &mut self.players[departing];
        player.rounds += 1;
        player.reset_turn();

        self.current_player = 1 - departing;
        self.players[self.current_player].reset_turn();

        info!(
            next = self.current_player,
            turns = self.mark_history.len(),
            "Turn ended"
        );
        self.debug_check_invariants();
    }

    /// Removes the most recent mark of the turn in progress.
    ///
    /// Returns false if the turn has no marks or the game is over.
    #[instrument(skip(self))]
    pub fn undo_last_mark(&mut self) -> bool {
        if self.game_over {
            debug!("Undo refused, game is over");
            return false;
        }
        let Some(mark) = self.current_turn.pop() else {
            debug!("Nothing to undo in this turn");
            return false;
        };

        let player = &mut self.players[mark.player_index];
        if mark.was_scoring {
            player.score = player.score.saturating_sub(mark.points);
        } else {
            player.sectors.decrement(mark.sector);
        }
        player.marks_this_round = player.marks_this_round.saturating_sub(1);
        player.turn_hits.decrement(mark.sector);

        debug!(sector = %mark.sector, was_scoring = mark.was_scoring, "Mark undone");
        self.debug_check_invariants();
        true
    }

    /// Rolls back to the end of the previous player's turn.
    ///
    /// The turn in progress is unwound mark by mark, then the last
    /// completed turn is reopened as the turn in progress. Its marks stay
    /// applied; only the per-turn bookkeeping is rebuilt.
    ///
    /// Returns false if no turn has been completed or the game is over.
    #[instrument(skip(self))]
    pub fn undo_last_turn(&mut self) -> bool {
        if self.game_over {
            debug!("Undo refused, game is over");
            return false;
        }
        let Some(turn) = self.mark_history.pop() else {
            debug!("No completed turn to undo");
            return false;
        };

        while self.undo_last_mark() {}
        self.players[self.current_player].reset_turn();

        let owner = 1 - self.current_player;
        self.current_player = owner;
        let player = &mut self.players[owner];
        player.rounds = player.rounds.saturating_sub(1).max(1);
        player.reset_turn();
        for mark in &turn {
            player.marks_this_round += 1;
            player.turn_hits.increment(mark.sector);
        }
        self.current_turn = turn;

        info!(player = owner, marks = self.current_turn.len(), "Turn reopened");
        self.debug_check_invariants();
        true
    }

    /// Checks whether the game has finished and latches the result.
    ///
    /// A player finishes the game by closing every sector while holding a
    /// score no lower than anyone else's.
    #[instrument(skip(self))]
    pub fn check_game_over(&mut self) -> bool {
        if !self.game_over && rules::has_finished(&self.players) {
            self.game_over = true;
            info!(
                score0 = self.players[0].score,
                score1 = self.players[1].score,
                "Game over"
            );
        }
        self.game_over
    }

    /// Index of the winner of a finished game.
    ///
    /// # Errors
    ///
    /// Returns [`WinnerError::NotOver`] before the game has finished and
    /// [`WinnerError::Draw`] when score and closed sectors are level.
    #[instrument(skip(self))]
    pub fn winner_index(&self) -> Result<usize, WinnerError> {
        if !self.game_over {
            return Err(WinnerError::NotOver);
        }
        rules::decide_winner(&self.players)
    }

    /// State of a sector from the current player's point of view.
    pub fn sector_state(&self, sector: Sector) -> SectorState {
        rules::sector_state(
            &self.players[self.current_player],
            &self.players[self.opponent_index()],
            sector,
        )
    }

    /// A player's lead over the other (negative when trailing).
    pub fn score_diff(&self, index: usize) -> i64 {
        i64::from(self.players[index].score) - i64::from(self.players[1 - index].score)
    }

    #[cfg(test)]
    pub(crate) fn players_mut(&mut self) -> &mut [Player; 2] {
        &mut self.players
    }

    /// Verifies all rule invariants in debug builds.
    fn debug_check_invariants(&self) {
        if cfg!(debug_assertions)
            && let Err(violations) = CricketInvariants::check_all(self)
        {
            for violation in &violations {
                error!(description = %violation.description, "Invariant violated");
            }
            panic!("Cricket invariants violated: {:?}", violations);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> CricketGame {
        CricketGame::new("Verano", "Invierno", GameSettings::default()).unwrap()
    }

    #[test]
    fn test_new_rejects_blank_names() {
        let err = CricketGame::new("  ", "Invierno", GameSettings::default()).unwrap_err();
        assert_eq!(err, SetupError::EmptyName { index: 0 });
        let err = CricketGame::new("Verano", "", GameSettings::default()).unwrap_err();
        assert_eq!(err, SetupError::EmptyName { index: 1 });
    }

    #[test]
    fn test_new_rejects_bad_settings() {
        let result = CricketGame::new("A", "B", GameSettings::new(10, 12, 25));
        assert!(matches!(result, Err(SetupError::InvalidRange { .. })));
    }

    #[test]
    fn test_hit_outside_range_rejected() {
        let mut game = game();
        assert_eq!(
            game.try_apply_hit(Hit::single(Sector::Number(3))),
            Err(HitRejection::NotInPlay(Sector::Number(3)))
        );
        assert!(game.current_turn().is_empty());
    }

    #[test]
    fn test_zero_hits_rejected() {
        let mut game = game();
        assert!(!game.apply_hits(Sector::Number(20), 0));
        assert_eq!(game.player(0).marks_this_round(), 0);
    }

    #[test]
    fn test_closing_hit_is_not_scoring() {
        let mut game = game();
        for _ in 0..3 {
            let mark = game.try_apply_hit(Hit::single(Sector::Number(19))).unwrap();
            assert!(!mark.was_scoring);
            assert_eq!(mark.points, 0);
        }
        assert!(game.player(0).is_closed(Sector::Number(19)));
        assert_eq!(game.player(0).score(), 0);
        assert_eq!(game.sector_state(Sector::Number(19)), SectorState::PlayerScoring);
    }

    #[test]
    fn test_bull_scores_bull_points() {
        let mut game = game();
        for _ in 0..4 {
            assert!(game.apply_hit(Sector::Bull));
        }
        assert_eq!(game.player(0).score(), 25);
        assert_eq!(game.player(0).hits(Sector::Bull), 3);
        assert_eq!(game.score_diff(0), 25);
        assert_eq!(game.score_diff(1), -25);
    }

    #[test]
    fn test_fourth_sector_in_turn_rejected() {
        let mut game = game();
        assert!(game.apply_hit(Sector::Number(20)));
        assert!(game.apply_hit(Sector::Number(19)));
        assert!(game.apply_hit(Sector::Number(18)));
        assert_eq!(
            game.try_apply_hit(Hit::single(Sector::Number(17))),
            Err(HitRejection::TurnSectorLimit(Sector::Number(17)))
        );
        // Already touched sectors are still fine.
        assert!(game.apply_hit(Sector::Number(18)));
    }

    #[test]
    fn test_tenth_mark_rejected() {
        let mut game = game();
        for _ in 0..4 {
            assert!(game.apply_hit(Sector::Number(20)));
        }
        for _ in 0..4 {
            assert!(game.apply_hit(Sector::Number(19)));
        }
        assert!(game.apply_hit(Sector::Bull));
        assert_eq!(game.player(0).marks_this_round(), 9);
        assert_eq!(
            game.try_apply_hit(Hit::single(Sector::Bull)),
            Err(HitRejection::TurnMarkLimit {
                recorded: 9,
                requested: 1
            })
        );
    }

    #[test]
    fn test_multi_hit_checks_turn_budget() {
        let mut game = game();
        for _ in 0..7 {
            assert!(game.apply_hit(Sector::Number(20)));
        }
        assert!(!game.apply_hits(Sector::Number(20), 3));
        assert!(game.apply_hits(Sector::Number(20), 2));
        assert_eq!(game.player(0).marks_this_round(), 8);
    }

    #[test]
    fn test_end_turn_switches_and_counts_rounds() {
        let mut game = game();
        game.apply_hit(Sector::Number(20));
        game.end_turn();
        assert_eq!(game.current_player(), 1);
        assert_eq!(game.player(0).rounds(), 2);
        assert_eq!(game.player(1).rounds(), 1);
        assert_eq!(game.player(0).marks_this_round(), 0);
        assert_eq!(game.player(0).mpr(), 0.5);
        assert_eq!(game.mark_history().len(), 1);
        assert!(game.current_turn().is_empty());
    }

    #[test]
    fn test_empty_turn_can_end() {
        let mut game = game();
        game.end_turn();
        game.end_turn();
        assert_eq!(game.current_player(), 0);
        assert_eq!(game.mark_history().len(), 2);
        assert!(game.mark_history().iter().all(Vec::is_empty));
    }

    #[test]
    fn test_undo_mark_on_empty_turn_fails() {
        let mut game = game();
        assert!(!game.undo_last_mark());
        game.apply_hit(Sector::Number(20));
        game.end_turn();
        assert!(!game.undo_last_mark());
    }

    #[test]
    fn test_undo_scoring_mark_restores_score_only() {
        let mut game = game();
        for _ in 0..3 {
            game.apply_hit(Sector::Number(16));
        }
        let before = game.clone();
        game.apply_hit(Sector::Number(16));
        assert_eq!(game.player(0).score(), 16);
        assert!(game.undo_last_mark());
        assert_eq!(game, before);
    }

    #[test]
    fn test_undo_turn_without_history_fails() {
        let mut game = game();
        game.apply_hit(Sector::Bull);
        assert!(!game.undo_last_turn());
        assert_eq!(game.current_turn().len(), 1);
    }

    #[test]
    fn test_undo_turn_unwinds_open_turn() {
        let mut game = game();
        game.apply_hit(Sector::Number(20));
        game.apply_hit(Sector::Number(20));
        let before_end = game.clone();
        game.end_turn();
        game.apply_hit(Sector::Bull);
        game.apply_hit(Sector::Number(15));

        assert!(game.undo_last_turn());
        assert_eq!(game, before_end);
        assert_eq!(game.player(1).hits(Sector::Bull), 0);
        assert_eq!(game.player(0).sectors_hit_this_round(), vec![Sector::Number(20)]);
    }

    #[test]
    fn test_winner_before_game_over_is_error() {
        let game = game();
        assert_eq!(game.winner_index(), Err(WinnerError::NotOver));
    }

    #[test]
    fn test_game_over_blocks_hits_and_undo() {
        let mut game = CricketGame::new("A", "B", GameSettings::new(20, 20, 25)).unwrap();
        for _ in 0..3 {
            game.apply_hit(Sector::Number(20));
        }
        for _ in 0..3 {
            game.apply_hit(Sector::Bull);
        }
        assert!(game.check_game_over());
        assert_eq!(game.winner_index(), Ok(0));
        assert!(!game.apply_hit(Sector::Number(20)));
        assert!(!game.undo_last_mark());
        assert!(!game.undo_last_turn());
        assert!(game.check_game_over());
    }
}
