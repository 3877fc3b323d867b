//! Cricket history - durable records of played games.
//!
//! # Architecture
//!
//! - **Records**: [`GameRecord`] is the JSON document written per game,
//!   named after its round count, both players' MPR and the save time
//! - **Store**: [`HistoryStore`] persists, lists, loads, deletes, exports
//!   and imports records in one directory
//! - **Statistics**: [`aggregate_statistics`] folds any set of records into
//!   per-player figures
//!
//! # Example
//!
//! ```no_run
//! use cricket_core::{CricketGame, GameSettings, Sector};
//! use cricket_history::{GameOutcome, HistoryStore};
//!
//! # fn main() -> Result<(), cricket_history::HistoryError> {
//! let store = HistoryStore::new("/tmp/window_cricket");
//! let mut game = CricketGame::new("Verano", "Invierno", GameSettings::default()).unwrap();
//! game.apply_hit(Sector::Bull);
//! store.persist(&game, GameOutcome::Aborted)?;
//! for name in store.list_records()? {
//!     println!("{}", name);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod record;
mod stats;
mod store;

pub use error::{HistoryError, HistoryErrorKind};
pub use record::{
    FILE_TIMESTAMP_FORMAT, GameOutcome, GameRecord, PlayerSummary, RECORD_EXTENSION,
    WinnerSummary, parse_file_timestamp,
};
pub use stats::{PlayerStats, aggregate_statistics};
pub use store::{EXPORT_PREFIX, ExportBundle, HistoryStore, LatestGame, METADATA_FILE};
