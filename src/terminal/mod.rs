//! Terminal abstraction.
//!
//! A [`Terminal`] is the single blocking resource shared by the shell loop and
//! the flows that commands launch. Raw input arrives as [`TerminalEvent`]s from
//! a producer thread; output is either a live [`Frame`] that is redrawn in
//! place, or committed lines that scroll away.

pub mod channel;
pub mod console;
pub mod line;
pub mod script;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::error::Result;

/// An input event delivered to the consumer side of a terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    /// A key press.
    Key(KeyEvent),
    /// Interrupt keystroke (Ctrl-C). Aborts the current read.
    Interrupt,
    /// Ctrl-D, or the producer went away.
    EndOfInput,
}

impl TerminalEvent {
    /// Maps a raw key press, turning Ctrl-C and Ctrl-D into their signals.
    pub fn from_key(key: KeyEvent) -> Self {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => return Self::Interrupt,
                KeyCode::Char('d') => return Self::EndOfInput,
                _ => {}
            }
        }
        Self::Key(key)
    }

    /// Key press for a plain character.
    pub fn char(c: char) -> Self {
        Self::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    /// Key press for a key without modifiers.
    pub fn key(code: KeyCode) -> Self {
        Self::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    /// Key press with Ctrl held.
    pub fn ctrl(c: char) -> Self {
        Self::from_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }
}

/// The live region of the screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub lines: Vec<String>,
    /// Cursor as (row, column) within `lines`; end of the last line when unset.
    pub cursor: Option<(usize, usize)>,
}

impl Frame {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            cursor: None,
        }
    }

    pub fn with_cursor(mut self, row: usize, column: usize) -> Self {
        self.cursor = Some((row, column));
        self
    }
}

/// A blocking terminal.
///
/// Only one reader may hold the terminal at a time; it is lent down the call
/// chain as `&mut dyn Terminal` and returned when the borrow ends.
pub trait Terminal: Send {
    /// Blocks until the next input event.
    fn read_event(&mut self) -> Result<TerminalEvent>;

    /// Replaces the live region with the given frame.
    fn render(&mut self, frame: &Frame) -> Result<()>;

    /// Clears the live region and writes a permanent line.
    fn write_line(&mut self, line: &str) -> Result<()>;

    /// Writes several permanent lines.
    fn write_lines(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            self.write_line(line)?;
        }
        Ok(())
    }
}
