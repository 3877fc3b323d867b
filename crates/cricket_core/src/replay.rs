//! Forward-only replay of a recorded game.
//!
//! A [`Replay`] rebuilds a fresh [`CricketGame`] from the recorded settings
//! and feeds it the recorded marks one per tick. The tick source lives
//! outside: a timer calls [`Replay::tick`], a user calls [`Replay::step`].
//! Stepping backwards is not supported.

use crate::action::{Hit, HitRejection};
use crate::game::CricketGame;
use crate::sector::{GameSettings, SetupError};
use crate::types::Mark;
use tracing::{debug, info, instrument, warn};

/// Where the replay is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ReplayStatus {
    /// Advancing on every tick.
    Playing,
    /// Ticks are ignored; single steps still work.
    Paused,
    /// Every recorded mark has been applied.
    Finished,
    /// The record could not be replayed; see [`Replay::error`].
    Halted,
}

/// Why a replay stopped early. Any of these means the record is corrupt.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::From)]
pub enum ReplayError {
    /// The recorded settings or names do not describe a valid game.
    #[display("Recorded game cannot be set up: {}", _0)]
    Setup(SetupError),

    /// The engine refused a recorded mark.
    #[display("Turn {} mark {} was refused: {}", round, mark, reason)]
    #[from(ignore)]
    Rejected {
        /// Turn index.
        round: usize,
        /// Mark index within the turn.
        mark: usize,
        /// The engine's reason.
        reason: HitRejection,
    },

    /// A recorded mark belongs to the wrong player for its turn.
    #[display("Turn {} belongs to player {}, record says {}", round, expected, found)]
    #[from(ignore)]
    PlayerMismatch {
        /// Turn index.
        round: usize,
        /// Player whose turn it is.
        expected: usize,
        /// Player named in the record.
        found: usize,
    },

    /// The engine produced a different mark than the one recorded.
    #[display("Turn {} mark {} does not match the record", round, mark)]
    #[from(ignore)]
    Diverged {
        /// Turn index.
        round: usize,
        /// Mark index within the turn.
        mark: usize,
    },
}

impl std::error::Error for ReplayError {}

/// Deterministic forward replay of recorded turns.
///
/// Every completed turn is ended once its marks are applied, empty ones
/// included, so the rebuilt game ends with the same player to throw and
/// the same round counts as the recorded one.
#[derive(Debug, Clone)]
pub struct Replay {
    game: CricketGame,
    /// Completed turns followed by the open turn.
    turns: Vec<Vec<Mark>>,
    completed: usize,
    current_round: usize,
    current_mark: usize,
    status: ReplayStatus,
    error: Option<ReplayError>,
}

impl Replay {
    /// Starts a replay of the completed turns in `history` followed by the
    /// marks of `open_turn`, in the playing state.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::Setup`] if the names or settings are invalid.
    #[instrument(
        skip(name1, name2, history, open_turn),
        fields(turns = history.len(), open = open_turn.len())
    )]
    pub fn new(
        name1: impl AsRef<str>,
        name2: impl AsRef<str>,
        settings: GameSettings,
        history: Vec<Vec<Mark>>,
        open_turn: Vec<Mark>,
    ) -> Result<Self, ReplayError> {
        let game = CricketGame::new(name1, name2, settings)?;
        let completed = history.len();
        let mut turns = history;
        turns.push(open_turn);
        let mut replay = Self {
            game,
            turns,
            completed,
            current_round: 0,
            current_mark: 0,
            status: ReplayStatus::Playing,
            error: None,
        };
        if !replay.has_remaining() {
            replay.finish();
        }
        info!(total = replay.total_marks(), "Replay ready");
        Ok(replay)
    }

    /// The game as rebuilt so far.
    pub fn game(&self) -> &CricketGame {
        &self.game
    }

    /// Current status.
    pub fn status(&self) -> ReplayStatus {
        self.status
    }

    /// The corruption that halted the replay, if any.
    pub fn error(&self) -> Option<&ReplayError> {
        self.error.as_ref()
    }

    /// Index of the recorded turn being replayed.
    pub fn current_round(&self) -> usize {
        self.current_round
    }

    /// Index of the next mark within the current turn.
    pub fn current_mark(&self) -> usize {
        self.current_mark
    }

    /// Number of recorded marks.
    pub fn total_marks(&self) -> usize {
        self.turns.iter().map(Vec::len).sum()
    }

    /// Number of marks applied so far.
    pub fn applied_marks(&self) -> usize {
        self.turns
            .iter()
            .take(self.current_round)
            .map(Vec::len)
            .sum::<usize>()
            + self.current_mark
    }

    /// True once nothing more will happen.
    pub fn is_done(&self) -> bool {
        matches!(self.status, ReplayStatus::Finished | ReplayStatus::Halted)
    }

    /// Stops reacting to ticks.
    #[instrument(skip(self))]
    pub fn pause(&mut self) {
        if self.status == ReplayStatus::Playing {
            self.status = ReplayStatus::Paused;
            debug!("Replay paused");
        }
    }

    /// Reacts to ticks again.
    #[instrument(skip(self))]
    pub fn resume(&mut self) {
        if self.status == ReplayStatus::Paused {
            self.status = ReplayStatus::Playing;
            debug!("Replay resumed");
        }
    }

    /// Timer signal: applies one mark while playing, otherwise does nothing.
    pub fn tick(&mut self) -> ReplayStatus {
        if self.status == ReplayStatus::Playing {
            self.advance();
        }
        self.status
    }

    /// Applies one mark regardless of pause state.
    pub fn step(&mut self) -> ReplayStatus {
        if !self.is_done() {
            self.advance();
        }
        self.status
    }

    /// Applies every remaining mark.
    pub fn run_to_end(&mut self) -> ReplayStatus {
        while !self.is_done() {
            self.advance();
        }
        self.status
    }

    /// Consumes exactly one recorded mark, ending exhausted turns first.
    #[instrument(skip(self), fields(round = self.current_round, mark = self.current_mark))]
    fn advance(&mut self) {
        self.end_exhausted_turns();
        let (round, index) = (self.current_round, self.current_mark);
        let Some(&stored) = self.turns.get(round).and_then(|turn| turn.get(index)) else {
            self.finish();
            return;
        };

        let expected = self.game.current_player();
        if stored.player_index != expected {
            self.halt(ReplayError::PlayerMismatch {
                round,
                expected,
                found: stored.player_index,
            });
            return;
        }

        match self.game.try_apply_hit(Hit::single(stored.sector)) {
            Ok(mark) if mark == stored => {
                self.current_mark += 1;
                debug!(sector = %mark.sector, points = mark.points, "Replayed mark");
                if !self.has_remaining() {
                    self.finish();
                }
            }
            Ok(_) => self.halt(ReplayError::Diverged { round, mark: index }),
            Err(reason) => self.halt(ReplayError::Rejected {
                round,
                mark: index,
                reason,
            }),
        }
    }

    /// Ends every completed turn whose marks have all been applied.
    fn end_exhausted_turns(&mut self) {
        while self.current_round < self.completed
            && self.current_mark >= self.turns[self.current_round].len()
        {
            self.game.end_turn();
            self.current_round += 1;
            self.current_mark = 0;
        }
    }

    fn has_remaining(&self) -> bool {
        self.applied_marks() < self.total_marks()
    }

    fn finish(&mut self) {
        self.end_exhausted_turns();
        self.status = ReplayStatus::Finished;
        let over = self.game.check_game_over();
        info!(game_over = over, "Replay finished");
    }

    fn halt(&mut self, error: ReplayError) {
        warn!(%error, "Replay halted on corrupt record");
        self.status = ReplayStatus::Halted;
        self.error = Some(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sector;

    fn mark(player_index: usize, sector: Sector, points: u32) -> Mark {
        Mark {
            player_index,
            sector,
            was_scoring: points > 0,
            points,
        }
    }

    #[test]
    fn test_empty_history_finishes_immediately() {
        let replay =
            Replay::new("A", "B", GameSettings::default(), Vec::new(), Vec::new()).unwrap();
        assert_eq!(replay.status(), ReplayStatus::Finished);
        assert_eq!(replay.total_marks(), 0);
    }

    #[test]
    fn test_bad_settings_fail_setup() {
        let result = Replay::new("A", "B", GameSettings::new(5, 9, 25), Vec::new(), Vec::new());
        assert!(matches!(result, Err(ReplayError::Setup(_))));
    }

    #[test]
    fn test_each_tick_consumes_one_mark() {
        let history = vec![vec![mark(0, Sector::Number(20), 0), mark(0, Sector::Number(20), 0)]];
        let open = vec![mark(1, Sector::Bull, 0)];
        let mut replay = Replay::new("A", "B", GameSettings::default(), history, open).unwrap();

        assert_eq!(replay.tick(), ReplayStatus::Playing);
        assert_eq!(replay.applied_marks(), 1);
        assert_eq!(replay.tick(), ReplayStatus::Playing);
        assert_eq!(replay.game().current_player(), 0);

        assert_eq!(replay.tick(), ReplayStatus::Finished);
        assert_eq!(replay.game().current_player(), 1);
        assert_eq!(replay.game().player(1).hits(Sector::Bull), 1);
        assert_eq!(replay.applied_marks(), 3);
        assert_eq!(replay.tick(), ReplayStatus::Finished);
    }

    #[test]
    fn test_empty_turns_are_ended() {
        let history = vec![vec![], vec![]];
        let open = vec![mark(0, Sector::Number(15), 0)];
        let mut replay = Replay::new("A", "B", GameSettings::default(), history, open).unwrap();
        assert_eq!(replay.tick(), ReplayStatus::Finished);
        assert_eq!(replay.game().mark_history().len(), 2);
        assert_eq!(replay.game().player(0).rounds(), 2);
        assert_eq!(replay.game().player(1).rounds(), 2);
    }

    #[test]
    fn test_trailing_completed_turns_are_ended() {
        let history = vec![
            vec![mark(0, Sector::Number(20), 0)],
            vec![mark(1, Sector::Number(19), 0)],
            vec![],
        ];
        let mut replay =
            Replay::new("A", "B", GameSettings::default(), history, Vec::new()).unwrap();
        assert_eq!(replay.run_to_end(), ReplayStatus::Finished);
        assert_eq!(replay.game().mark_history().len(), 3);
        assert_eq!(replay.game().current_player(), 1);
        assert_eq!(replay.game().player(0).rounds(), 3);
        assert_eq!(replay.game().player(1).rounds(), 2);
        assert!((replay.game().player(1).mpr() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_history_without_marks_still_ends_its_turns() {
        let replay =
            Replay::new("A", "B", GameSettings::default(), vec![vec![]], Vec::new()).unwrap();
        assert_eq!(replay.status(), ReplayStatus::Finished);
        assert_eq!(replay.game().current_player(), 1);
        assert_eq!(replay.game().player(0).rounds(), 2);
    }

    #[test]
    fn test_pause_blocks_ticks_but_not_steps() {
        let history = vec![vec![
            mark(0, Sector::Number(19), 0),
            mark(0, Sector::Number(18), 0),
            mark(0, Sector::Number(17), 0),
        ]];
        let mut replay =
            Replay::new("A", "B", GameSettings::default(), history, Vec::new()).unwrap();
        replay.pause();
        assert_eq!(replay.tick(), ReplayStatus::Paused);
        assert_eq!(replay.applied_marks(), 0);

        assert_eq!(replay.step(), ReplayStatus::Paused);
        assert_eq!(replay.applied_marks(), 1);

        replay.resume();
        assert_eq!(replay.tick(), ReplayStatus::Playing);
        assert_eq!(replay.run_to_end(), ReplayStatus::Finished);
        assert_eq!(replay.applied_marks(), 3);
    }

    #[test]
    fn test_wrong_player_halts() {
        let history = vec![vec![mark(1, Sector::Number(20), 0)]];
        let mut replay =
            Replay::new("A", "B", GameSettings::default(), history, Vec::new()).unwrap();
        assert_eq!(replay.tick(), ReplayStatus::Halted);
        assert_eq!(
            replay.error(),
            Some(&ReplayError::PlayerMismatch {
                round: 0,
                expected: 0,
                found: 1
            })
        );
        assert_eq!(replay.tick(), ReplayStatus::Halted);
        assert_eq!(replay.game().player(0).hits(Sector::Number(20)), 0);
    }

    #[test]
    fn test_refused_mark_halts() {
        let history = vec![vec![mark(0, Sector::Number(2), 0)]];
        let mut replay =
            Replay::new("A", "B", GameSettings::default(), history, Vec::new()).unwrap();
        assert_eq!(replay.run_to_end(), ReplayStatus::Halted);
        assert!(matches!(
            replay.error(),
            Some(ReplayError::Rejected {
                reason: HitRejection::NotInPlay(_),
                ..
            })
        ));
    }

    #[test]
    fn test_points_mismatch_halts() {
        // A first hit can never score.
        let history = vec![vec![mark(0, Sector::Number(20), 20)]];
        let mut replay =
            Replay::new("A", "B", GameSettings::default(), history, Vec::new()).unwrap();
        assert_eq!(replay.step(), ReplayStatus::Halted);
        assert_eq!(
            replay.error(),
            Some(&ReplayError::Diverged { round: 0, mark: 0 })
        );
    }
}
