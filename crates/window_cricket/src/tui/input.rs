//! Key mapping for the live board and the replay viewer.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key does to the command line under the live board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    /// Append a character.
    Insert(char),
    /// Drop the last character.
    Backspace,
    /// Run the typed command.
    Submit,
    /// Empty the command line.
    Clear,
    /// Abandon the game.
    Quit,
}

/// Replay viewer controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayKey {
    /// Pause or resume the clock.
    TogglePause,
    /// Apply one mark.
    Step,
    /// Close the viewer.
    Quit,
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Maps a key on the live board. Releases and unbound keys map to nothing.
pub fn edit_key(key: KeyEvent) -> Option<EditKey> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if is_ctrl_c(&key) {
        return Some(EditKey::Quit);
    }
    match key.code {
        KeyCode::Char(c) => Some(EditKey::Insert(c)),
        KeyCode::Backspace => Some(EditKey::Backspace),
        KeyCode::Enter => Some(EditKey::Submit),
        KeyCode::Esc => Some(EditKey::Clear),
        _ => None,
    }
}

/// Maps a key in the replay viewer.
pub fn replay_key(key: KeyEvent) -> Option<ReplayKey> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if is_ctrl_c(&key) {
        return Some(ReplayKey::Quit);
    }
    match key.code {
        KeyCode::Char('p') | KeyCode::Char(' ') => Some(ReplayKey::TogglePause),
        KeyCode::Char('s') | KeyCode::Right => Some(ReplayKey::Step),
        KeyCode::Char('q') | KeyCode::Esc => Some(ReplayKey::Quit),
        _ => None,
    }
}
