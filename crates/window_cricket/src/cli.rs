//! Command-line interface for window_cricket.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Window Cricket - two-player cricket darts scoring
#[derive(Parser, Debug)]
#[command(name = "window_cricket")]
#[command(about = "Score cricket darts, keep a history and replay past games", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "window_cricket.toml")]
    pub config: PathBuf,

    /// Directory holding game records (overrides config and environment)
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score a live game on a full-screen board
    Play {
        /// First player's name (defaults to the last game's)
        #[arg(long)]
        p1: Option<String>,

        /// Second player's name (defaults to the last game's)
        #[arg(long)]
        p2: Option<String>,

        /// Highest numbered sector in play
        #[arg(long)]
        highest: Option<u8>,

        /// Lowest numbered sector in play
        #[arg(long)]
        lowest: Option<u8>,

        /// Points for a scoring bull
        #[arg(long)]
        bull_points: Option<u32>,
    },

    /// List stored games, most recent first
    List,

    /// Show one stored game
    Show {
        /// Record file name as printed by `list`
        name: String,
    },

    /// Delete one stored game
    Delete {
        /// Record file name as printed by `list`
        name: String,
    },

    /// Per-player statistics over every stored game
    Stats,

    /// Replay a stored game mark by mark
    Replay {
        /// Record file name as printed by `list`
        name: String,

        /// Milliseconds between marks
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Write every stored game into one bundle file
    Export {
        /// Directory to write the bundle into
        #[arg(default_value = ".")]
        dest: PathBuf,
    },

    /// Load games from a bundle written by `export`
    Import {
        /// Bundle file
        bundle: PathBuf,
    },
}

impl Command {
    /// True for the commands that take over the terminal.
    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Play { .. } | Self::Replay { .. })
    }
}
