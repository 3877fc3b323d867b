//! State behind the live board and the replay viewer.

use cricket_core::{CricketGame, Replay, ReplayStatus};
use cricket_history::GameOutcome;
use crossterm::event::KeyEvent;
use tracing::{debug, info, instrument};

use super::input::{EditKey, ReplayKey, edit_key, replay_key};
use crate::play::PlayCommand;

const PROMPT: &str = "Type a sector and press Enter, ? for help";

/// A live game plus the command line typed under it.
#[derive(Debug)]
pub struct PlayApp {
    game: CricketGame,
    input: String,
    status_message: String,
    outcome: Option<GameOutcome>,
    show_help: bool,
}

impl PlayApp {
    /// Wraps a freshly set up game.
    pub fn new(game: CricketGame) -> Self {
        Self {
            game,
            input: String::new(),
            status_message: PROMPT.to_string(),
            outcome: None,
            show_help: false,
        }
    }

    /// The game being played.
    pub fn game(&self) -> &CricketGame {
        &self.game
    }

    /// The command typed so far.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Feedback on the last command.
    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// How the game ended, once it has.
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// True while the command list replaces the board.
    pub fn show_help(&self) -> bool {
        self.show_help
    }

    /// Edits or submits the command line.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.outcome.is_some() {
            return;
        }
        match edit_key(key) {
            Some(EditKey::Insert(c)) => self.input.push(c),
            Some(EditKey::Backspace) => {
                self.input.pop();
            }
            Some(EditKey::Clear) => self.input.clear(),
            Some(EditKey::Submit) => {
                let line = std::mem::take(&mut self.input);
                self.submit(&line);
            }
            Some(EditKey::Quit) => self.execute(PlayCommand::Quit),
            None => {}
        }
    }

    /// Parses and runs one command line. Blank lines do nothing.
    pub fn submit(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        match line.parse::<PlayCommand>() {
            Ok(command) => self.execute(command),
            Err(e) => self.status_message = format!("{} (? for help)", e),
        }
    }

    /// Applies one command to the game.
    #[instrument(skip(self), fields(player = self.game.current_player()))]
    pub fn execute(&mut self, command: PlayCommand) {
        if self.outcome.is_some() {
            return;
        }
        debug!(?command, "Command");
        self.show_help = false;

        self.status_message = match command {
            PlayCommand::Hit(hit) => match self.game.try_apply_hit(hit) {
                Ok(mark) => {
                    let thrower = self.game.player(mark.player_index).name().to_string();
                    if self.game.check_game_over() {
                        info!("Game finished");
                        self.outcome = Some(GameOutcome::Finished);
                        "Game over, press any key to save and leave".to_string()
                    } else if mark.was_scoring {
                        format!("{} hit {} for {}", thrower, mark.sector, mark.points)
                    } else {
                        format!("{} hit {}", thrower, mark.sector)
                    }
                }
                Err(reason) => reason.to_string(),
            },
            PlayCommand::EndTurn => {
                self.game.end_turn();
                format!("{} to throw", self.game.player(self.game.current_player()).name())
            }
            PlayCommand::UndoMark => {
                if self.game.undo_last_mark() {
                    "Last mark undone".to_string()
                } else {
                    "Nothing to undo in this turn".to_string()
                }
            }
            PlayCommand::UndoTurn => {
                if self.game.undo_last_turn() {
                    "Previous turn reopened".to_string()
                } else {
                    "No earlier turn to reopen".to_string()
                }
            }
            PlayCommand::Quit => {
                info!("Game abandoned");
                self.outcome = Some(GameOutcome::Aborted);
                "Game abandoned".to_string()
            }
            PlayCommand::Help => {
                self.show_help = true;
                PROMPT.to_string()
            }
        };
    }

    /// The game as it ended and how. A game left without an outcome counts
    /// as abandoned.
    pub fn into_result(self) -> (CricketGame, GameOutcome) {
        (self.game, self.outcome.unwrap_or(GameOutcome::Aborted))
    }
}

/// A replay plus whether the viewer has been closed.
#[derive(Debug)]
pub struct ReplayApp {
    replay: Replay,
    closed: bool,
}

impl ReplayApp {
    /// Wraps a replay ready to play.
    pub fn new(replay: Replay) -> Self {
        Self {
            replay,
            closed: false,
        }
    }

    /// The replay being shown.
    pub fn replay(&self) -> &Replay {
        &self.replay
    }

    /// True once the viewer should close.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Pauses, steps or closes.
    #[instrument(skip(self), fields(applied = self.replay.applied_marks()))]
    pub fn handle_key(&mut self, key: KeyEvent) {
        match replay_key(key) {
            Some(ReplayKey::TogglePause) => match self.replay.status() {
                ReplayStatus::Playing => self.replay.pause(),
                _ => self.replay.resume(),
            },
            Some(ReplayKey::Step) => {
                self.replay.step();
            }
            Some(ReplayKey::Quit) => {
                info!("Replay viewer closed");
                self.closed = true;
            }
            None => {}
        }
    }

    /// Clock signal.
    pub fn on_tick(&mut self) -> ReplayStatus {
        self.replay.tick()
    }

    /// Progress and outcome line under the board.
    pub fn status_line(&self) -> String {
        let progress = format!(
            "mark {}/{} [{}]",
            self.replay.applied_marks(),
            self.replay.total_marks(),
            self.replay.status()
        );
        let game = self.replay.game();
        match (self.replay.status(), self.replay.error()) {
            (ReplayStatus::Halted, Some(e)) => format!("{}  Replay halted: {}", progress, e),
            (ReplayStatus::Finished, _) => match game.winner_index() {
                Ok(winner) => format!(
                    "{}  Replay finished, {} won",
                    progress,
                    game.player(winner).name()
                ),
                Err(_) => format!("{}  Replay finished", progress),
            },
            _ => progress,
        }
    }

    /// Hands the replay back in whatever state the viewer left it.
    pub fn into_replay(self) -> Replay {
        self.replay
    }
}
