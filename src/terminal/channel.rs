//! Channel-backed terminal.
//!
//! Input events travel over an unbounded tokio channel from a producer thread
//! ([`TerminalFeeder`]) to the consumer ([`ChannelTerminal`]), which blocks on
//! it. Output is captured in a shared transcript that other threads can read
//! through [`TerminalOutput`] while the consumer is running.

use std::sync::{Arc, Mutex, PoisonError};

use crossterm::event::KeyCode;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::trace;

use super::{Frame, Terminal, TerminalEvent};
use crate::error::{Result, ShellError};

/// Creates a connected feeder/receiver pair.
pub fn event_channel() -> (TerminalFeeder, EventReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (TerminalFeeder { sender }, EventReceiver { receiver })
}

/// Producer side of the event channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TerminalFeeder {
    sender: UnboundedSender<TerminalEvent>,
}

impl TerminalFeeder {
    /// Sends one event. Fails once the consumer is gone.
    pub fn send(&self, event: TerminalEvent) -> Result<()> {
        self.sender
            .send(event)
            .map_err(|_| ShellError::terminal("terminal consumer has gone away"))
    }

    /// Sends each character of `text` as a key press.
    pub fn text(&self, text: &str) -> Result<()> {
        text.chars().try_for_each(|c| self.send(TerminalEvent::char(c)))
    }

    /// Sends `text` followed by Enter.
    pub fn line(&self, text: &str) -> Result<()> {
        self.text(text)?;
        self.enter()
    }

    pub fn key(&self, code: KeyCode) -> Result<()> {
        self.send(TerminalEvent::key(code))
    }

    pub fn enter(&self) -> Result<()> {
        self.key(KeyCode::Enter)
    }

    pub fn interrupt(&self) -> Result<()> {
        self.send(TerminalEvent::Interrupt)
    }

    pub fn end_of_input(&self) -> Result<()> {
        self.send(TerminalEvent::EndOfInput)
    }
}

/// Consumer side of the event channel.
#[derive(Debug)]
pub struct EventReceiver {
    receiver: UnboundedReceiver<TerminalEvent>,
}

impl EventReceiver {
    /// Blocks for the next event. A closed channel reads as end of input.
    ///
    /// Must not be called from within an async runtime.
    pub fn recv_blocking(&mut self) -> TerminalEvent {
        self.receiver
            .blocking_recv()
            .unwrap_or(TerminalEvent::EndOfInput)
    }
}

#[derive(Debug, Default)]
struct Screen {
    transcript: Vec<String>,
    frame: Frame,
}

/// Read handle on what a [`ChannelTerminal`] has written.
#[derive(Debug, Clone, Default)]
pub struct TerminalOutput {
    screen: Arc<Mutex<Screen>>,
}

impl TerminalOutput {
    /// Committed lines so far.
    pub fn lines(&self) -> Vec<String> {
        self.lock().transcript.clone()
    }

    /// Committed lines joined with newlines.
    pub fn text(&self) -> String {
        self.lock().transcript.join("\n")
    }

    /// The live frame currently displayed.
    pub fn frame(&self) -> Frame {
        self.lock().frame.clone()
    }

    /// Returns true if any committed line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lock().transcript.iter().any(|l| l.contains(needle))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Screen> {
        self.screen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Terminal fed through a channel, with captured output.
#[derive(Debug)]
pub struct ChannelTerminal {
    events: EventReceiver,
    output: TerminalOutput,
    events_read: usize,
}

impl ChannelTerminal {
    /// Creates a terminal and the feeder that drives it.
    pub fn new() -> (Self, TerminalFeeder) {
        let (feeder, events) = event_channel();
        (Self::with_receiver(events), feeder)
    }

    pub fn with_receiver(events: EventReceiver) -> Self {
        Self {
            events,
            output: TerminalOutput::default(),
            events_read: 0,
        }
    }

    /// Handle for reading output from another thread.
    pub fn output(&self) -> TerminalOutput {
        self.output.clone()
    }

    /// Number of events consumed so far.
    pub fn events_read(&self) -> usize {
        self.events_read
    }
}

impl Terminal for ChannelTerminal {
    fn read_event(&mut self) -> Result<TerminalEvent> {
        let event = self.events.recv_blocking();
        trace!(?event, "Read terminal event");
        if event != TerminalEvent::EndOfInput {
            self.events_read += 1;
        }
        Ok(event)
    }

    fn render(&mut self, frame: &Frame) -> Result<()> {
        self.output.lock().frame = frame.clone();
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        let mut screen = self.output.lock();
        screen.frame = Frame::default();
        screen.transcript.push(line.to_string());
        Ok(())
    }
}
