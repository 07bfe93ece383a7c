//! Keystroke and resize input using crossterm
//!
//! Features:
//! - Polling with a caller-supplied timeout (so ticks stay on schedule)
//! - Unicode character input
//! - Ctrl+C mapped to an immediate exit

use crate::session::{Event, Key};
use crossterm::event::{self, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io::Result as IoResult;
use std::time::Duration;

/// Handles user input from terminal
pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        InputHandler
    }

    /// Enable raw mode for terminal input
    pub fn enable_raw_mode() -> IoResult<()> {
        crossterm::terminal::enable_raw_mode()
    }

    /// Disable raw mode and restore terminal
    pub fn disable_raw_mode() -> IoResult<()> {
        crossterm::terminal::disable_raw_mode()
    }

    /// Wait up to `timeout` for a terminal event.
    /// Returns None on timeout or for events the game ignores.
    pub fn read_event(&self, timeout: Duration) -> Result<Option<Event>, Box<dyn std::error::Error>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }

        match event::read()? {
            event::Event::Key(key_event) => Ok(Self::map_key(&key_event).map(Event::Key)),
            event::Event::Resize(width, height) => Ok(Some(Event::Resize { width, height })),
            _ => Ok(None),
        }
    }

    /// Map a crossterm key event to a game key
    pub fn map_key(key: &KeyEvent) -> Option<Key> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Key::Interrupt)
            }
            KeyCode::Esc => Some(Key::Escape),
            KeyCode::Enter => Some(Key::Enter),
            KeyCode::Backspace => Some(Key::Backspace),
            // Only plain characters (not Ctrl, not Alt)
            KeyCode::Char(c)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                Some(Key::Char(c))
            }
            _ => None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
