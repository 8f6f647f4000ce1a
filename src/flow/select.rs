//! Item selectors.
//!
//! A selector shows a list of items with a cursor. Down or Ctrl-E moves the
//! cursor down, Up or Ctrl-Y moves it up, Space toggles the item under the
//! cursor in a multi selector, Enter accepts. Disabled items are skipped.

use crossterm::event::{KeyCode, KeyModifiers};

use crate::error::{Result, ShellError};
use crate::terminal::{Frame, Terminal, TerminalEvent};

/// One selectable item: a display name and the value it binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectItem {
    name: String,
    item: String,
    enabled: bool,
    selected: bool,
}

impl SelectItem {
    pub fn of(name: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            item: item.into(),
            enabled: true,
            selected: false,
        }
    }

    /// Makes the item unselectable.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Pre-checks the item in a multi selector.
    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value bound when this item is chosen.
    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }
}

/// Cursor and check state over a list of items.
#[derive(Debug, Clone)]
pub(crate) struct Selector {
    items: Vec<SelectItem>,
    cursor: usize,
    checked: Vec<bool>,
    multi: bool,
}

impl Selector {
    pub(crate) fn new(items: Vec<SelectItem>, multi: bool) -> Self {
        let checked = items.iter().map(|i| multi && i.selected && i.enabled).collect();
        let cursor = items.iter().position(|i| i.enabled).unwrap_or(0);
        Self {
            items,
            cursor,
            checked,
            multi,
        }
    }

    /// Moves the cursor to the enabled item with the given name or value.
    pub(crate) fn highlight(&mut self, name: &str) {
        if let Some(index) = self.items.iter().position(|i| i.enabled && (i.name == name || i.item == name)) {
            self.cursor = index;
        }
    }

    /// Checks exactly the enabled items whose name or value is listed,
    /// replacing any preselection. Multi selectors only.
    pub(crate) fn check_only(&mut self, names: &[String]) {
        if !self.multi {
            return;
        }
        for (item, checked) in self.items.iter().zip(self.checked.iter_mut()) {
            *checked = item.enabled && names.iter().any(|n| *n == item.name || *n == item.item);
        }
    }

    pub(crate) fn move_down(&mut self) {
        self.step(1);
    }

    pub(crate) fn move_up(&mut self) {
        self.step(self.items.len().saturating_sub(1));
    }

    /// Advances the cursor by `by` positions with wrap-around, landing on the
    /// next enabled item.
    fn step(&mut self, by: usize) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        let mut next = self.cursor;
        for _ in 0..len {
            next = (next + by) % len;
            if self.items[next].enabled {
                self.cursor = next;
                return;
            }
        }
    }

    pub(crate) fn toggle(&mut self) {
        if self.multi && self.items.get(self.cursor).is_some_and(|i| i.enabled) {
            self.checked[self.cursor] = !self.checked[self.cursor];
        }
    }

    pub(crate) fn current(&self) -> Option<&SelectItem> {
        self.items.get(self.cursor).filter(|i| i.enabled)
    }

    /// Values of the checked items, in item order.
    pub(crate) fn checked_values(&self) -> Vec<String> {
        self.items
            .iter()
            .zip(&self.checked)
            .filter(|(_, checked)| **checked)
            .map(|(item, _)| item.item.clone())
            .collect()
    }

    pub(crate) fn frame(&self, header: &str) -> Frame {
        let mut lines = vec![header.to_string()];
        for (index, item) in self.items.iter().enumerate() {
            let pointer = if index == self.cursor { '>' } else { ' ' };
            let mut line = match (self.multi, self.checked[index]) {
                (true, true) => format!("{pointer} [x] {}", item.name),
                (true, false) => format!("{pointer} [ ] {}", item.name),
                (false, _) => format!("{pointer} {}", item.name),
            };
            if !item.enabled {
                line.push_str(" (disabled)");
            }
            lines.push(line);
        }
        let row = self.cursor + 1;
        Frame::new(lines).with_cursor(row, 0)
    }

    /// Runs the key loop until Enter. Interrupt cancels, end of input terminates.
    pub(crate) fn run(&mut self, header: &str, terminal: &mut dyn Terminal) -> Result<()> {
        loop {
            terminal.render(&self.frame(header))?;

            let key = match terminal.read_event()? {
                TerminalEvent::Key(key) => key,
                TerminalEvent::Interrupt => return Err(ShellError::Cancelled),
                TerminalEvent::EndOfInput => return Err(ShellError::Terminated),
            };

            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            match key.code {
                KeyCode::Enter => return Ok(()),
                KeyCode::Down => self.move_down(),
                KeyCode::Up => self.move_up(),
                KeyCode::Char('e') if ctrl => self.move_down(),
                KeyCode::Char('y') if ctrl => self.move_up(),
                KeyCode::Char(' ') => self.toggle(),
                _ => {}
            }
        }
    }
}
