//! Stateless rendering of the live board and the replay viewer.

use cricket_core::{CricketGame, MAX_MARKS_PER_TURN, SectorState};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use super::app::{PlayApp, ReplayApp};
use crate::play::HELP;

const REPLAY_CONTROLS: &str = "p pause/resume, s step, q quit";

/// Board glyph for a sector count.
fn marks_glyph(count: u8) -> &'static str {
    match count {
        0 => "",
        1 => "/",
        2 => "X",
        _ => "(X)",
    }
}

fn state_label(state: SectorState) -> (&'static str, Style) {
    match state {
        SectorState::Open => ("", Style::default()),
        SectorState::PlayerScoring => ("scoring", Style::default().fg(Color::Green)),
        SectorState::OpponentScoring => ("defend", Style::default().fg(Color::Red)),
        SectorState::Closed => ("dead", Style::default().fg(Color::DarkGray)),
    }
}

/// One-line summary of whose turn it is, or how the game ended.
pub fn turn_summary(game: &CricketGame) -> String {
    if game.is_game_over() {
        return match game.winner_index() {
            Ok(winner) => format!("Game over, {} wins", game.player(winner).name()),
            Err(e) => format!("Game over, {}", e),
        };
    }
    let current = game.current_player();
    let thrower = game.player(current);
    format!(
        "{} to throw, round {}, marks {}/{}, lead {:+}",
        thrower.name(),
        thrower.rounds(),
        thrower.marks_this_round(),
        MAX_MARKS_PER_TURN,
        game.score_diff(current)
    )
}

fn title(frame: &mut Frame, area: Rect, text: &str) {
    let title = Paragraph::new(text.to_string())
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(title, area);
}

fn status(frame: &mut Frame, area: Rect, text: String) {
    let status = Paragraph::new(text)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, area);
}

/// Renders the marks table, the current player's column highlighted.
fn draw_board(frame: &mut Frame, area: Rect, game: &CricketGame) {
    let [a, b] = game.players();
    let current = game.current_player();
    let name_cell = |index: usize, name: &str| {
        if index == current && !game.is_game_over() {
            Cell::from(format!("> {}", name))
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        } else {
            Cell::from(name.to_string())
        }
    };
    let header = Row::new(vec![
        Cell::from(""),
        name_cell(0, a.name()),
        name_cell(1, b.name()),
        Cell::from(""),
    ]);

    let mut rows: Vec<Row> = game
        .settings()
        .sectors()
        .map(|sector| {
            let (label, style) = state_label(game.sector_state(sector));
            Row::new(vec![
                Cell::from(sector.to_string()),
                Cell::from(marks_glyph(a.hits(sector))),
                Cell::from(marks_glyph(b.hits(sector))),
                Cell::from(label).style(style),
            ])
        })
        .collect();
    rows.push(Row::new(vec![
        Cell::from("Score"),
        Cell::from(a.score().to_string()),
        Cell::from(b.score().to_string()),
        Cell::from(""),
    ]));
    rows.push(Row::new(vec![
        Cell::from("MPR"),
        Cell::from(format!("{:.2}", a.mpr())),
        Cell::from(format!("{:.2}", b.mpr())),
        Cell::from(""),
    ]));

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(16),
            Constraint::Length(16),
            Constraint::Min(8),
        ],
    )
    .header(header.style(Style::default().add_modifier(Modifier::UNDERLINED)))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(turn_summary(game)),
    );
    frame.render_widget(table, area);
}

/// Renders the live board with the command line and last feedback.
pub fn draw_play(frame: &mut Frame, app: &PlayApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // Title
            Constraint::Min(12),    // Board or help
            Constraint::Length(3),  // Command line
            Constraint::Length(3),  // Status
        ])
        .split(frame.area());

    title(frame, chunks[0], "Window Cricket");

    if app.show_help() {
        let help = Paragraph::new(HELP).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Commands"),
        );
        frame.render_widget(help, chunks[1]);
    } else {
        draw_board(frame, chunks[1], app.game());
    }

    let prompt = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Cyan)),
        Span::raw(app.input().to_string()),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Command"));
    frame.render_widget(prompt, chunks[2]);

    status(frame, chunks[3], app.status_message().to_string());
}

/// Renders a replay with its progress line and controls.
pub fn draw_replay(frame: &mut Frame, app: &ReplayApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // Title
            Constraint::Min(12),    // Board
            Constraint::Length(3),  // Progress
            Constraint::Length(1),  // Controls
        ])
        .split(frame.area());

    title(frame, chunks[0], "Window Cricket - Replay");
    draw_board(frame, chunks[1], app.replay().game());
    status(frame, chunks[2], app.status_line());

    let controls = Paragraph::new(REPLAY_CONTROLS)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(controls, chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cricket_core::{GameSettings, Replay, Sector};
    use ratatui::{Terminal, backend::TestBackend};

    fn game() -> CricketGame {
        let mut game = CricketGame::new("Verano", "Invierno", GameSettings::default()).unwrap();
        for _ in 0..4 {
            game.apply_hit(Sector::Number(20));
        }
        game.apply_hit(Sector::Bull);
        game
    }

    fn screen(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    #[test]
    fn test_turn_summary() {
        assert_eq!(
            turn_summary(&game()),
            "Verano to throw, round 1, marks 5/9, lead +20"
        );
    }

    #[test]
    fn test_board_shows_marks_and_turn() {
        let app = PlayApp::new(game());
        let mut terminal = Terminal::new(TestBackend::new(72, 24)).unwrap();
        terminal.draw(|frame| draw_play(frame, &app)).unwrap();
        let lines = screen(&terminal);

        assert!(lines[0].contains("Window Cricket"));
        assert!(lines.iter().any(|l| l.contains("Verano to throw, round 1, marks 5/9, lead +20")));
        assert!(lines.iter().any(|l| l.contains("> Verano") && l.contains("Invierno")));
        let twenty = lines
            .iter()
            .find(|l| l.contains("(X)"))
            .expect("No closed sector row");
        assert!(twenty.contains("20"));
        assert!(twenty.contains("scoring"));
        assert!(lines.iter().any(|l| l.contains("Score") && l.contains("20")));
    }

    #[test]
    fn test_help_replaces_the_board() {
        let mut app = PlayApp::new(game());
        app.submit("?");
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|frame| draw_play(frame, &app)).unwrap();
        let lines = screen(&terminal);
        assert!(lines.iter().any(|l| l.contains("undo-turn")));
        assert!(!lines.iter().any(|l| l.contains("(X)")));
    }

    #[test]
    fn test_replay_view_shows_progress() {
        let mut game = game();
        game.end_turn();
        let replay = Replay::new(
            "Verano",
            "Invierno",
            GameSettings::default(),
            game.mark_history().to_vec(),
            Vec::new(),
        )
        .unwrap();
        let app = ReplayApp::new(replay);
        let mut terminal = Terminal::new(TestBackend::new(72, 20)).unwrap();
        terminal.draw(|frame| draw_replay(frame, &app)).unwrap();
        let lines = screen(&terminal);
        assert!(lines.iter().any(|l| l.contains("mark 0/5 [Playing]")));
        assert!(lines.iter().any(|l| l.contains("p pause/resume, s step, q quit")));
    }
}
