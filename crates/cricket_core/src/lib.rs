//! Cricket core - the two-player cricket darts state machine.
//!
//! # Architecture
//!
//! - **Sectors**: configured range of numbered sectors plus the bull, with
//!   fixed-size per-sector tallies
//! - **Engine**: [`CricketGame`] applies hits, ends turns, undoes marks and
//!   whole turns exactly, and detects the end of the game
//! - **Invariants**: rule properties checked after every mutation in debug
//!   builds
//! - **Replay**: [`Replay`] rebuilds a recorded game one mark per tick
//!
//! # Example
//!
//! ```
//! use cricket_core::{CricketGame, GameSettings, Sector};
//!
//! let mut game = CricketGame::new("Verano", "Invierno", GameSettings::default()).unwrap();
//! for _ in 0..4 {
//!     assert!(game.apply_hit(Sector::Number(20)));
//! }
//! assert_eq!(game.player(0).score(), 20);
//! game.end_turn();
//! assert_eq!(game.current_player(), 1);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod game;
pub mod invariants;
mod replay;
mod rules;
mod sector;
mod types;

pub use action::{Hit, HitRejection, WinnerError};
pub use game::CricketGame;
pub use replay::{Replay, ReplayError, ReplayStatus};
pub use rules::{SectorState, decide_winner, has_finished, is_scoring_hit, sector_state};
pub use sector::{
    CLOSED, GameSettings, MAX_BULL_POINTS, MAX_NUMBER, Sector, SectorParseError, SectorTally,
    SetupError,
};
pub use types::{MAX_MARKS_PER_TURN, MAX_SECTORS_PER_TURN, Mark, Player};
