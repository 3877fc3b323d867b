//! Window Cricket - terminal front end for two-player cricket darts.
//!
//! # Architecture
//!
//! - **Config**: [`AppConfig`] from TOML, environment and flags
//! - **Play**: full-screen live scoring with [`tui::run_play`]
//! - **Replay**: timed forward playback of stored games with [`tui::run_replay`]
//! - **Render**: plain-text record and statistics output for the batch
//!   subcommands
//!
//! The game rules live in `cricket_core` and storage in `cricket_history`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cli;
mod config;
mod play;
pub mod render;
pub mod tui;

pub use cli::{Cli, Command};
pub use config::{AppConfig, ConfigError, STORE_DIR_ENV};
pub use play::{CommandParseError, HELP, PlayCommand, save};
