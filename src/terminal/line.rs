//! Line reading over terminal events.
//!
//! A small line editor: printable keys insert at the cursor, the usual
//! movement and deletion keys edit the buffer, Tab asks a completer for
//! proposals. Every read ends in one of three ways, see [`LineEvent`].

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{Frame, Terminal, TerminalEvent};
use crate::completion::{CompletionContext, CompletionProposal};
use crate::error::Result;

/// How a line read ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// Enter was pressed.
    Submitted(String),
    /// Interrupt was pressed; the pending text is discarded.
    Interrupted { discarded: String },
    /// Ctrl-D or the input stream ended.
    EndOfInput,
}

/// Completion hook used on Tab.
pub type Completer<'a> = &'a dyn Fn(&CompletionContext) -> Vec<CompletionProposal>;

/// Reads one line from a terminal.
pub struct LineReader<'a> {
    prompt: String,
    mask: Option<char>,
    completer: Option<Completer<'a>>,
    transient: bool,
}

impl<'a> LineReader<'a> {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            mask: None,
            completer: None,
            transient: false,
        }
    }

    /// Clears the line when the read ends instead of committing it.
    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    /// Displays every typed character as `mask`.
    pub fn mask(mut self, mask: Option<char>) -> Self {
        self.mask = mask;
        self
    }

    pub fn completer(mut self, completer: Completer<'a>) -> Self {
        self.completer = Some(completer);
        self
    }

    /// Blocks until the line is submitted, interrupted or the input ends.
    /// The final state of the line is committed to the terminal unless the
    /// reader is transient.
    pub fn read(&self, terminal: &mut dyn Terminal) -> Result<LineEvent> {
        let mut buffer: Vec<char> = Vec::new();
        let mut cursor = 0;

        loop {
            self.draw(terminal, &buffer, cursor)?;

            let key = match terminal.read_event()? {
                TerminalEvent::Key(key) => key,
                TerminalEvent::Interrupt => {
                    self.finish(terminal, &buffer)?;
                    return Ok(LineEvent::Interrupted {
                        discarded: buffer.into_iter().collect(),
                    });
                }
                TerminalEvent::EndOfInput => {
                    self.finish(terminal, &buffer)?;
                    return Ok(LineEvent::EndOfInput);
                }
            };

            if key.code == KeyCode::Enter {
                self.finish(terminal, &buffer)?;
                return Ok(LineEvent::Submitted(buffer.into_iter().collect()));
            }

            if key.code == KeyCode::Tab {
                self.complete(terminal, &mut buffer, &mut cursor)?;
            } else {
                edit(key, &mut buffer, &mut cursor);
            }
        }
    }

    fn display(&self, buffer: &[char]) -> String {
        match self.mask {
            Some(mask) => std::iter::repeat(mask).take(buffer.len()).collect(),
            None => buffer.iter().collect(),
        }
    }

    fn line(&self, buffer: &[char]) -> String {
        format!("{}{}", self.prompt, self.display(buffer))
    }

    fn finish(&self, terminal: &mut dyn Terminal, buffer: &[char]) -> Result<()> {
        if self.transient {
            terminal.render(&Frame::default())
        } else {
            terminal.write_line(&self.line(buffer))
        }
    }

    fn draw(&self, terminal: &mut dyn Terminal, buffer: &[char], cursor: usize) -> Result<()> {
        let column = self.prompt.chars().count() + cursor;
        terminal.render(&Frame::new(vec![self.line(buffer)]).with_cursor(0, column))
    }

    fn complete(
        &self,
        terminal: &mut dyn Terminal,
        buffer: &mut Vec<char>,
        cursor: &mut usize,
    ) -> Result<()> {
        let Some(completer) = self.completer else {
            return Ok(());
        };

        let before: String = buffer[..*cursor].iter().collect();
        let context = CompletionContext::for_line(&before);
        let typed = context.current_word_prefix();
        let proposals = completer(&context);

        let replacement = match proposals.as_slice() {
            [] => return Ok(()),
            [only] if only.is_complete() => format!("{} ", only.value()),
            [only] => only.value().to_string(),
            many => {
                let common = common_prefix(many.iter().map(CompletionProposal::value));
                if common.chars().count() > typed.chars().count() {
                    common
                } else {
                    terminal.write_line(&self.line(buffer))?;
                    let listing: Vec<&str> = many.iter().map(CompletionProposal::display_text).collect();
                    terminal.write_line(&listing.join("  "))?;
                    return Ok(());
                }
            }
        };

        let start = cursor.saturating_sub(typed.chars().count());
        buffer.drain(start..*cursor);
        *cursor = start;
        for c in replacement.chars() {
            buffer.insert(*cursor, c);
            *cursor += 1;
        }
        Ok(())
    }
}

/// Applies an editing key to the buffer.
fn edit(key: KeyEvent, buffer: &mut Vec<char>, cursor: &mut usize) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('a') if ctrl => *cursor = 0,
        KeyCode::Char('e') if ctrl => *cursor = buffer.len(),
        KeyCode::Char('u') if ctrl => {
            buffer.drain(..*cursor);
            *cursor = 0;
        }
        KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
            buffer.insert(*cursor, c);
            *cursor += 1;
        }
        KeyCode::Backspace if *cursor > 0 => {
            *cursor -= 1;
            buffer.remove(*cursor);
        }
        KeyCode::Delete if *cursor < buffer.len() => {
            buffer.remove(*cursor);
        }
        KeyCode::Left => *cursor = cursor.saturating_sub(1),
        KeyCode::Right => *cursor = (*cursor + 1).min(buffer.len()),
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = buffer.len(),
        _ => {}
    }
}

fn common_prefix<'s>(mut values: impl Iterator<Item = &'s str>) -> String {
    let Some(first) = values.next() else {
        return String::new();
    };
    let mut prefix: Vec<char> = first.chars().collect();
    for value in values {
        let shared = prefix
            .iter()
            .zip(value.chars())
            .take_while(|(a, b)| **a == *b)
            .count();
        prefix.truncate(shared);
    }
    prefix.into_iter().collect()
}
