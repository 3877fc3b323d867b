//! Full-screen terminal front end for live play and replay.

mod app;
mod input;
mod ui;

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use cricket_core::{CricketGame, Replay, ReplayStatus};
use cricket_history::GameOutcome;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, info, instrument};

pub use app::{PlayApp, ReplayApp};
pub use input::{EditKey, ReplayKey, edit_key, replay_key};
pub use ui::{draw_play, draw_replay, turn_summary};

type Tui = Terminal<CrosstermBackend<Stdout>>;

fn enter() -> io::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn leave(terminal: &mut Tui) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

/// Runs a live game on the terminal until it is won or abandoned.
///
/// Returns the game as it ended and how.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up, drawn or read.
#[instrument(skip_all, fields(p1 = game.player(0).name(), p2 = game.player(1).name()))]
pub fn run_play(game: CricketGame) -> Result<(CricketGame, GameOutcome)> {
    let mut terminal = enter()?;
    let mut app = PlayApp::new(game);
    let res = play_loop(&mut terminal, &mut app);
    leave(&mut terminal)?;

    if let Err(err) = res {
        error!(error = ?err, "Play loop error");
        return Err(err);
    }
    Ok(app.into_result())
}

fn play_loop(terminal: &mut Tui, app: &mut PlayApp) -> Result<()> {
    loop {
        terminal.draw(|frame| draw_play(frame, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        // Any key leaves the final board.
        if app.outcome().is_some() {
            return Ok(());
        }
        app.handle_key(key);
        if app.outcome() == Some(GameOutcome::Aborted) {
            return Ok(());
        }
    }
}

/// Shows a replay on the terminal, one mark per `interval`, until the
/// viewer is closed.
///
/// Returns the replay in whatever state it was left.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up, drawn or read.
#[instrument(skip_all, fields(total = replay.total_marks(), interval_ms = interval.as_millis() as u64))]
pub fn run_replay(replay: Replay, interval: Duration) -> Result<Replay> {
    let mut terminal = enter()?;
    let mut app = ReplayApp::new(replay);
    let res = replay_loop(&mut terminal, &mut app, interval);
    leave(&mut terminal)?;

    if let Err(err) = res {
        error!(error = ?err, "Replay loop error");
        return Err(err);
    }
    let replay = app.into_replay();
    info!(applied = replay.applied_marks(), status = %replay.status(), "Replay viewer left");
    Ok(replay)
}

fn replay_loop(terminal: &mut Tui, app: &mut ReplayApp, interval: Duration) -> Result<()> {
    let mut next_tick = Instant::now() + interval;
    while !app.is_closed() {
        terminal.draw(|frame| draw_replay(frame, app))?;

        let timeout = next_tick.saturating_duration_since(Instant::now());
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
        {
            app.handle_key(key);
        }

        let now = Instant::now();
        if app.replay().status() != ReplayStatus::Playing {
            // The clock restarts in full on resume.
            next_tick = now + interval;
        } else if now >= next_tick {
            app.on_tick();
            next_tick = now + interval;
        }
    }
    Ok(())
}
