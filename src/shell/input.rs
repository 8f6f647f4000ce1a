//! Input sources for the shell loop.

use std::collections::VecDeque;

use tracing::debug;

use crate::commands::tokenizer::split_words;
use crate::error::{Result, ShellError};
use crate::terminal::line::{Completer, LineEvent, LineReader};
use crate::terminal::Terminal;

/// One logical input line and its words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Input {
    raw: String,
    words: Vec<String>,
}

impl Input {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let words = split_words(&raw);
        Self { raw, words }
    }

    /// An input with no words.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Source of input lines.
///
/// `Ok(None)` signals the end of the stream. `Err(ShellError::Cancelled)`
/// aborts only the current read and `Err(ShellError::Terminated)` ends the
/// shell.
pub trait InputProvider {
    fn read_input(&mut self, terminal: &mut dyn Terminal) -> Result<Option<Input>>;
}

/// Reads lines interactively from the terminal.
pub struct TerminalInputProvider<'a> {
    prompt: String,
    completer: Option<Completer<'a>>,
}

impl<'a> TerminalInputProvider<'a> {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            completer: None,
        }
    }

    /// Enables Tab completion through `completer`.
    pub fn completer(mut self, completer: Completer<'a>) -> Self {
        self.completer = Some(completer);
        self
    }
}

impl InputProvider for TerminalInputProvider<'_> {
    fn read_input(&mut self, terminal: &mut dyn Terminal) -> Result<Option<Input>> {
        let mut reader = LineReader::new(self.prompt.as_str());
        if let Some(completer) = self.completer {
            reader = reader.completer(completer);
        }

        match reader.read(terminal)? {
            LineEvent::Submitted(line) => Ok(Some(Input::new(line))),
            // Interrupt with pending text only clears the line
            LineEvent::Interrupted { discarded } if !discarded.is_empty() => {
                debug!("Discarded pending input on interrupt");
                Ok(Some(Input::empty()))
            }
            LineEvent::Interrupted { .. } => Err(ShellError::Terminated),
            LineEvent::EndOfInput => Ok(None),
        }
    }
}

/// Feeds a fixed list of lines, e.g. from a script file.
#[derive(Debug, Default)]
pub struct ScriptedInputProvider {
    lines: VecDeque<String>,
    echo_prompt: Option<String>,
}

impl ScriptedInputProvider {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            echo_prompt: None,
        }
    }

    /// Writes each line to the terminal behind `prompt` before it runs.
    pub fn echo(mut self, prompt: impl Into<String>) -> Self {
        self.echo_prompt = Some(prompt.into());
        self
    }
}

impl InputProvider for ScriptedInputProvider {
    fn read_input(&mut self, terminal: &mut dyn Terminal) -> Result<Option<Input>> {
        let Some(line) = self.lines.pop_front() else {
            return Ok(None);
        };
        if let Some(prompt) = &self.echo_prompt {
            terminal.write_line(&format!("{prompt}{line}"))?;
        }
        Ok(Some(Input::new(line)))
    }
}
