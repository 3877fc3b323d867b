//! Window Cricket - CLI entry point.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cricket_core::{CricketGame, GameSettings};
use cricket_history::{HistoryStore, aggregate_statistics};
use tracing::{debug, info, instrument};
use tracing_subscriber::EnvFilter;
use window_cricket::{AppConfig, Cli, Command, render, tui};

/// Log destination while the terminal is taken over by the board.
const TUI_LOG_FILE: &str = "window_cricket_tui.log";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_tracing(&cli)?;

    let mut config = AppConfig::load(&cli.config)?;
    if let Some(dir) = cli.store_dir {
        config = config.with_store_dir(dir);
    }
    let store = HistoryStore::new(config.store_dir());
    info!(store = %store.dir().display(), "Window Cricket starting");

    match cli.command {
        Command::Play {
            p1,
            p2,
            highest,
            lowest,
            bull_points,
        } => {
            let base = config.settings();
            let settings = GameSettings::new(
                highest.unwrap_or(base.highest_sector),
                lowest.unwrap_or(base.lowest_sector),
                bull_points.unwrap_or(base.bull_points),
            );
            run_play(store, p1, p2, settings).await
        }
        Command::List => run_list(&store),
        Command::Show { name } => run_show(&store, &name),
        Command::Delete { name } => run_delete(&store, &name),
        Command::Stats => run_stats(&store),
        Command::Replay { name, interval_ms } => {
            let interval = Duration::from_millis(interval_ms.unwrap_or(*config.replay_interval_ms()));
            run_replay(&store, &name, interval).await
        }
        Command::Export { dest } => run_export(&store, dest),
        Command::Import { bundle } => run_import(&store, bundle),
    }
}

/// Logs to stderr, or to [`TUI_LOG_FILE`] for the commands that draw on the
/// terminal.
fn init_tracing(cli: &Cli) -> Result<()> {
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if cli.command.is_interactive() {
        let log_file = std::fs::File::create(TUI_LOG_FILE)
            .with_context(|| format!("Cannot create log file {}", TUI_LOG_FILE))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Arc::new(log_file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

/// Plays a live game on the terminal and stores it.
#[instrument(skip(store))]
async fn run_play(
    store: HistoryStore,
    p1: Option<String>,
    p2: Option<String>,
    settings: GameSettings,
) -> Result<()> {
    let latest = store.latest_players();
    let (name1, name2) = match (p1, p2, latest) {
        (Some(a), Some(b), _) => (a, b),
        (a, b, Some((last1, last2))) => (a.unwrap_or(last1), b.unwrap_or(last2)),
        (a, b, None) => (
            a.unwrap_or_else(|| "Player 1".to_string()),
            b.unwrap_or_else(|| "Player 2".to_string()),
        ),
    };
    debug!(%name1, %name2, "Players chosen");

    let game = CricketGame::new(name1, name2, settings).context("Cannot start game")?;
    let (game, outcome) = tokio::task::spawn_blocking(move || tui::run_play(game)).await??;

    if game.all_turns().all(<[_]>::is_empty) {
        println!("No throws recorded, nothing saved");
        return Ok(());
    }
    let path = window_cricket::save(&store, &game, outcome)?;
    println!("Saved {}", path.display());
    Ok(())
}

fn run_list(store: &HistoryStore) -> Result<()> {
    let names = store.list_records()?;
    if names.is_empty() {
        println!("No games recorded");
    }
    for (index, name) in names.iter().enumerate() {
        println!("{}", render::record_line(index, name));
    }
    Ok(())
}

fn run_show(store: &HistoryStore, name: &str) -> Result<()> {
    let record = store.load(name)?;
    print!("{}", render::record_details(name, &record));
    Ok(())
}

fn run_delete(store: &HistoryStore, name: &str) -> Result<()> {
    if !store.delete(name)? {
        bail!("No stored game named '{}'", name);
    }
    println!("Deleted {}", name);
    Ok(())
}

fn run_stats(store: &HistoryStore) -> Result<()> {
    let records: Vec<_> = store
        .load_all()?
        .into_iter()
        .map(|(_, record)| record)
        .collect();
    print!("{}", render::stats_table(&aggregate_statistics(&records)));
    Ok(())
}

#[instrument(skip(store))]
async fn run_replay(store: &HistoryStore, name: &str, interval: Duration) -> Result<()> {
    let record = store.load(name)?;
    let replay = record.start_replay()?;
    let replay = tokio::task::spawn_blocking(move || tui::run_replay(replay, interval)).await??;
    if let Some(e) = replay.error() {
        bail!("Replay of {} halted: {}", name, e);
    }
    println!("{}", tui::turn_summary(replay.game()));
    Ok(())
}

fn run_export(store: &HistoryStore, dest: PathBuf) -> Result<()> {
    let path = store.export(dest)?;
    println!("Exported to {}", path.display());
    Ok(())
}

fn run_import(store: &HistoryStore, bundle: PathBuf) -> Result<()> {
    let names = store.import(bundle)?;
    println!("Imported {} games", names.len());
    for name in names {
        println!("  {}", name);
    }
    Ok(())
}
