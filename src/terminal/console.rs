//! Interactive terminal on the real console.
//!
//! A dedicated reader thread turns crossterm key events into
//! [`TerminalEvent`]s; the consumer side redraws the live frame in place on
//! stdout while raw mode is enabled.

use std::io::{self, Stdout, Write};
use std::thread;

use crossterm::cursor::{MoveToColumn, MoveUp};
use crossterm::event::{self, Event as CrosstermEvent, KeyEventKind};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::queue;
use tracing::{debug, warn};

use super::channel::{event_channel, EventReceiver, TerminalFeeder};
use super::{Frame, Terminal, TerminalEvent};
use crate::error::{Result, ShellError};

/// Raw-mode console terminal.
pub struct ConsoleTerminal {
    events: EventReceiver,
    stdout: Stdout,
    live_lines: usize,
    cursor_row: usize,
}

impl ConsoleTerminal {
    /// Enables raw mode and starts the input reader thread.
    pub fn open() -> Result<Self> {
        terminal::enable_raw_mode()
            .map_err(|e| ShellError::terminal(format!("Failed to enable raw mode: {e}")))?;

        let (feeder, events) = event_channel();
        thread::Builder::new()
            .name("linewise-input".to_string())
            .spawn(move || read_console_events(feeder))
            .map_err(|e| ShellError::terminal(format!("Failed to spawn input thread: {e}")))?;

        debug!("Console terminal opened");
        Ok(Self {
            events,
            stdout: io::stdout(),
            live_lines: 0,
            cursor_row: 0,
        })
    }

    fn clear_live(&mut self) -> io::Result<()> {
        if self.live_lines > 0 {
            if self.cursor_row > 0 {
                queue!(self.stdout, MoveUp(to_u16(self.cursor_row)))?;
            }
            queue!(self.stdout, MoveToColumn(0), Clear(ClearType::FromCursorDown))?;
        }
        self.live_lines = 0;
        self.cursor_row = 0;
        Ok(())
    }
}

impl Terminal for ConsoleTerminal {
    fn read_event(&mut self) -> Result<TerminalEvent> {
        Ok(self.events.recv_blocking())
    }

    fn render(&mut self, frame: &Frame) -> Result<()> {
        self.clear_live()?;
        for (i, line) in frame.lines.iter().enumerate() {
            if i > 0 {
                queue!(self.stdout, Print("\r\n"))?;
            }
            queue!(self.stdout, Print(line))?;
        }

        let last = frame.lines.len().saturating_sub(1);
        self.live_lines = frame.lines.len();
        self.cursor_row = last;
        if let Some((row, column)) = frame.cursor {
            let row = row.min(last);
            if last > row {
                queue!(self.stdout, MoveUp(to_u16(last - row)))?;
            }
            queue!(self.stdout, MoveToColumn(to_u16(column)))?;
            self.cursor_row = row;
        }

        self.stdout.flush()?;
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.clear_live()?;
        // Raw mode: a bare newline does not return the carriage
        for part in line.split('\n') {
            queue!(self.stdout, Print(part), Print("\r\n"))?;
        }
        self.stdout.flush()?;
        Ok(())
    }
}

impl Drop for ConsoleTerminal {
    fn drop(&mut self) {
        let _ = self.clear_live();
        let _ = self.stdout.flush();
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("Failed to disable raw mode: {e}");
        }
    }
}

/// Reader loop run on the input thread until the consumer goes away.
fn read_console_events(feeder: TerminalFeeder) {
    loop {
        match event::read() {
            Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                if feeder.send(TerminalEvent::from_key(key)).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Failed to read console event: {e}");
                // Dropping the feeder closes the channel, which reads as end of input
                break;
            }
        }
    }
    debug!("Console input thread finished");
}

fn to_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}
