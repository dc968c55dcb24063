//! Key mapping from terminal events to UI actions.

use crate::cursor::Direction;
use crate::types::{Difficulty, Level};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press asks the front-end to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Move(Direction),
    /// Turn the tile under the cursor.
    Select,
    Restart,
    LoadLevel(Level),
    SetDifficulty(Difficulty),
}

/// Map keyboard input to UI actions.
pub fn handle_key_event(key: KeyEvent) -> Option<UiAction> {
    match key.code {
        // Cursor
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') => {
            Some(UiAction::Move(Direction::Left))
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') => {
            Some(UiAction::Move(Direction::Right))
        }
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') => Some(UiAction::Move(Direction::Up)),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') => {
            Some(UiAction::Move(Direction::Down))
        }

        KeyCode::Enter | KeyCode::Char(' ') => Some(UiAction::Select),

        KeyCode::Char('r') | KeyCode::Char('R') => Some(UiAction::Restart),

        // Level keys are 1-based on the keyboard.
        KeyCode::Char(c @ '1'..='4') => {
            Level::from_index(c as u8 - b'1').map(UiAction::LoadLevel)
        }

        KeyCode::Char('b') | KeyCode::Char('B') => {
            Some(UiAction::SetDifficulty(Difficulty::Beginner))
        }
        KeyCode::Char('i') | KeyCode::Char('I') => {
            Some(UiAction::SetDifficulty(Difficulty::Intermediate))
        }
        KeyCode::Char('a') | KeyCode::Char('A') => {
            Some(UiAction::SetDifficulty(Difficulty::Advanced))
        }

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
