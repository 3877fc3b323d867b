//! The persisted game record and its file naming.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use cricket_core::{CricketGame, GameSettings, Mark, Replay, ReplayError, Sector};
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::{HistoryError, HistoryErrorKind};

/// Timestamp layout embedded in record file names.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";

/// Extension of record files.
pub const RECORD_EXTENSION: &str = "json";

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOutcome {
    /// Played to the end; the record names a winner.
    Finished,
    /// Abandoned early; the record has no winner.
    Aborted,
}

/// Final standing of one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, new)]
pub struct PlayerSummary {
    name: String,
    score: u32,
    mpr: f64,
}

/// The winner of a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct WinnerSummary {
    id: usize,
    name: String,
    score: u32,
}

/// One stored game.
///
/// This is the on-disk JSON document: both players' standings, the winner
/// (absent for aborted games), the sector configuration, every completed
/// turn in order and the marks of the turn still open when the game was
/// stored (absent when empty).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct GameRecord {
    players: [PlayerSummary; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    winner: Option<WinnerSummary>,
    settings: GameSettings,
    history: Vec<Vec<Mark>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    open_turn: Vec<Mark>,
}

impl GameRecord {
    /// Snapshots a game for storage.
    ///
    /// Completed turns go to `history` and the turn in progress to
    /// `open_turn`, so a game won mid-turn keeps its final throws and a
    /// replay ends exactly the turns the players ended.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] for a finished game without a clear winner.
    #[instrument(skip(game), fields(turns = game.mark_history().len()))]
    pub fn from_game(game: &CricketGame, outcome: GameOutcome) -> Result<Self, HistoryError> {
        let players = game
            .players()
            .clone()
            .map(|p| PlayerSummary::new(p.name().to_string(), p.score(), p.mpr()));

        let winner = match outcome {
            GameOutcome::Aborted => None,
            GameOutcome::Finished => {
                let id = game
                    .winner_index()
                    .map_err(|e| {
                        HistoryError::new(
                            HistoryErrorKind::NoWinner,
                            format!("Cannot record a winner: {}", e),
                        )
                    })?;
                let player = game.player(id);
                Some(WinnerSummary::new(id, player.name().to_string(), player.score()))
            }
        };

        let history = game.mark_history().to_vec();
        let open_turn = game.current_turn().to_vec();

        debug!(?outcome, turns = history.len(), open = open_turn.len(), "Record built");
        Ok(Self {
            players,
            winner,
            settings: *game.settings(),
            history,
            open_turn,
        })
    }

    /// Completed turns, then the open turn if it holds any marks.
    pub fn turns(&self) -> impl Iterator<Item = &[Mark]> {
        self.history
            .iter()
            .map(Vec::as_slice)
            .chain((!self.open_turn.is_empty()).then_some(self.open_turn.as_slice()))
    }

    /// Rounds played: turns counted in pairs, rounded up.
    pub fn rounds(&self) -> usize {
        self.turns().count().div_ceil(2)
    }

    /// Rounds credited to one player, the denominator of their MPR.
    ///
    /// Every player starts on round one and gains a round for each turn
    /// they end.
    pub fn player_rounds(&self, index: usize) -> usize {
        1 + (0..self.history.len()).filter(|t| t % 2 == index).count()
    }

    /// Hits per sector thrown by one player.
    pub fn sector_hits(&self, index: usize) -> BTreeMap<Sector, u32> {
        let mut hits = BTreeMap::new();
        for mark in self.turns().flatten() {
            if mark.player_index == index {
                *hits.entry(mark.sector).or_insert(0) += 1;
            }
        }
        hits
    }

    /// True if the record names no winner.
    pub fn is_aborted(&self) -> bool {
        self.winner.is_none()
    }

    /// File name for this record saved at `timestamp`:
    /// `R{rounds} {name1}{mpr1:.2} vs {name2}{mpr2:.2} on {YYYYMMDD_HHMM}.json`.
    pub fn file_name(&self, timestamp: NaiveDateTime) -> String {
        let [a, b] = &self.players;
        format!(
            "R{} {}{:.2} vs {}{:.2} on {}.{}",
            self.rounds(),
            sanitize(&a.name),
            a.mpr,
            sanitize(&b.name),
            b.mpr,
            timestamp.format(FILE_TIMESTAMP_FORMAT),
            RECORD_EXTENSION
        )
    }

    /// Starts a forward replay of this record.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::Setup`] if the stored names or settings are
    /// unusable.
    #[instrument(skip(self))]
    pub fn start_replay(&self) -> Result<Replay, ReplayError> {
        let [a, b] = &self.players;
        Replay::new(
            &a.name,
            &b.name,
            self.settings,
            self.history.clone(),
            self.open_turn.clone(),
        )
    }
}

/// Keeps player names from escaping the store directory.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect()
}

/// Reads the save time back out of a record file name.
///
/// Returns `None` for names that do not follow the convention.
pub fn parse_file_timestamp(file_name: &str) -> Option<NaiveDateTime> {
    let stem = file_name.strip_suffix(&format!(".{}", RECORD_EXTENSION))?;
    let (_, stamp) = stem.rsplit_once(" on ")?;
    let stamp = stamp.get(..13)?;
    match NaiveDateTime::parse_from_str(stamp, FILE_TIMESTAMP_FORMAT) {
        Ok(ts) => Some(ts),
        Err(e) => {
            warn!(file_name, error = %e, "Unparseable record timestamp");
            None
        }
    }
}
