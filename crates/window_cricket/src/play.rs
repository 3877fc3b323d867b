//! Commands typed on the live board, and storing the finished game.

use std::path::PathBuf;
use std::str::FromStr;

use cricket_core::{CricketGame, Hit, Sector, SectorParseError};
use cricket_history::{GameOutcome, HistoryError, HistoryStore};
use derive_more::{Display, Error, From};
use tracing::{instrument, warn};

/// Command list shown on `?`.
pub const HELP: &str = "\
  20 .. 15, bull   record a hit (append xN to check N hits against the turn limit)
  n, next          end the turn
  u, undo          undo the last mark of this turn
  ut, undo-turn    reopen the previous turn
  q, quit          abandon the game (saved without a winner)
  ?, help          this text

  Enter runs the command, Esc clears it, Ctrl-C abandons the game.";

/// One command line during play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayCommand {
    /// Record a hit.
    Hit(Hit),
    /// End the current turn.
    EndTurn,
    /// Undo the last mark.
    UndoMark,
    /// Reopen the previous turn.
    UndoTurn,
    /// Abandon the game.
    Quit,
    /// Show the command list.
    Help,
}

/// Input that is not a command.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum CommandParseError {
    /// Not a sector label or keyword.
    #[display("{}", _0)]
    Sector(SectorParseError),
    /// The `xN` suffix is not a positive count.
    #[display("Invalid hit count '{}'", input)]
    #[from(ignore)]
    Count {
        /// The rejected count.
        input: String,
    },
}

impl FromStr for PlayCommand {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_ascii_lowercase();
        match input.as_str() {
            "n" | "next" => return Ok(Self::EndTurn),
            "u" | "undo" => return Ok(Self::UndoMark),
            "ut" | "undo-turn" => return Ok(Self::UndoTurn),
            "q" | "quit" => return Ok(Self::Quit),
            "?" | "h" | "help" => return Ok(Self::Help),
            _ => {}
        }

        let (sector, hits) = match input.rsplit_once('x') {
            Some((sector, count)) => {
                let hits = count
                    .trim()
                    .parse::<u8>()
                    .ok()
                    .filter(|&n| n > 0)
                    .ok_or_else(|| CommandParseError::Count {
                        input: count.trim().to_string(),
                    })?;
                (sector, hits)
            }
            None => (input.as_str(), 1),
        };
        let sector = sector.parse::<Sector>()?;
        Ok(Self::Hit(Hit::new(sector, hits)))
    }
}

/// Stores a game, falling back to an aborted record if a finished game has
/// no winner.
///
/// # Errors
///
/// Returns [`HistoryError`] if the record cannot be written.
#[instrument(skip(store, game))]
pub fn save(
    store: &HistoryStore,
    game: &CricketGame,
    outcome: GameOutcome,
) -> Result<PathBuf, HistoryError> {
    match store.persist(game, outcome) {
        Err(e) if outcome == GameOutcome::Finished => {
            warn!(error = %e, "Saving finished game without a winner");
            store.persist(game, GameOutcome::Aborted)
        }
        result => result,
    }
}
