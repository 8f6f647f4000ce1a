//! Event scripts for headless runs.
//!
//! A script is a list of events such as `line:hello world`, `key:enter` or
//! `key:ctrl+c`, separated by commas or newlines. Lines starting with `#` are
//! comments. `assert:` events are not fed to the terminal; they are checked
//! against the final transcript.

use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use regex::Regex;

use super::channel::TerminalFeeder;
use super::TerminalEvent;
use crate::error::{Result, ShellError};

/// Key names accepted in `key:` events. The first name of a key is the one
/// it is displayed with.
const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("enter", KeyCode::Enter),
    ("return", KeyCode::Enter),
    ("tab", KeyCode::Tab),
    ("space", KeyCode::Char(' ')),
    ("backspace", KeyCode::Backspace),
    ("bs", KeyCode::Backspace),
    ("delete", KeyCode::Delete),
    ("del", KeyCode::Delete),
    ("esc", KeyCode::Esc),
    ("escape", KeyCode::Esc),
    ("up", KeyCode::Up),
    ("down", KeyCode::Down),
    ("left", KeyCode::Left),
    ("right", KeyCode::Right),
    ("home", KeyCode::Home),
    ("end", KeyCode::End),
];

const MODIFIERS: &[(&str, KeyModifiers)] = &[
    ("ctrl", KeyModifiers::CONTROL),
    ("control", KeyModifiers::CONTROL),
    ("alt", KeyModifiers::ALT),
    ("shift", KeyModifiers::SHIFT),
];

/// A check against the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assertion {
    /// Case-insensitive substring.
    Contains(String),
    /// Case-sensitive substring.
    ContainsExact(String),
    /// Case-insensitive substring that must be absent.
    NotContains(String),
    /// Regular expression.
    Matches(String),
}

impl Assertion {
    pub fn check(&self, transcript: &str) -> bool {
        match self {
            Self::Contains(text) => transcript.to_lowercase().contains(&text.to_lowercase()),
            Self::ContainsExact(text) => transcript.contains(text.as_str()),
            Self::NotContains(text) => !transcript.to_lowercase().contains(&text.to_lowercase()),
            Self::Matches(pattern) => Regex::new(pattern).is_ok_and(|re| re.is_match(transcript)),
        }
    }

    fn parts(&self) -> (&'static str, &str) {
        match self {
            Self::Contains(text) => ("contains", text),
            Self::ContainsExact(text) => ("contains-exact", text),
            Self::NotContains(text) => ("not-contains", text),
            Self::Matches(pattern) => ("matches", pattern),
        }
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, value) = self.parts();
        write!(f, "assert:{kind}:{value}")
    }
}

impl FromStr for Assertion {
    type Err = ShellError;

    /// Parses the part after `assert:`, e.g. `contains:hello`.
    fn from_str(s: &str) -> Result<Self> {
        let (kind, value) = s
            .split_once(':')
            .ok_or_else(|| ShellError::config(format!("Invalid assertion '{s}', expected assert:KIND:VALUE")))?;
        let value = value.trim().to_string();
        match kind.trim().to_lowercase().as_str() {
            "contains" => Ok(Self::Contains(value)),
            "contains-exact" => Ok(Self::ContainsExact(value)),
            "not-contains" => Ok(Self::NotContains(value)),
            "matches" => {
                Regex::new(&value).map_err(|e| ShellError::config(format!("Invalid pattern '{value}': {e}")))?;
                Ok(Self::Matches(value))
            }
            other => Err(ShellError::config(format!(
                "Unknown assertion '{other}', expected contains, contains-exact, not-contains or matches"
            ))),
        }
    }
}

/// One event of a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEvent {
    /// A key press, possibly with modifiers.
    Key(KeyEvent),
    /// Text typed one character at a time.
    Type(String),
    /// Text followed by Enter.
    Line(String),
    /// Checked once the run is over.
    Assert(Assertion),
}

impl ScriptEvent {
    /// Sends this event to the terminal. Assertions send nothing.
    pub fn feed(&self, feeder: &TerminalFeeder) -> Result<()> {
        match self {
            Self::Key(key) => feeder.send(TerminalEvent::from_key(*key)),
            Self::Type(text) => feeder.text(text),
            Self::Line(text) => feeder.line(text),
            Self::Assert(_) => Ok(()),
        }
    }
}

impl fmt::Display for ScriptEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => {
                f.write_str("key:")?;
                let shown = [
                    ("ctrl", KeyModifiers::CONTROL),
                    ("alt", KeyModifiers::ALT),
                    ("shift", KeyModifiers::SHIFT),
                ];
                for (name, modifier) in shown {
                    if key.modifiers.contains(modifier) {
                        write!(f, "{name}+")?;
                    }
                }
                match NAMED_KEYS.iter().find(|(_, code)| *code == key.code) {
                    Some((name, _)) => f.write_str(name),
                    None => match key.code {
                        KeyCode::Char(c) => write!(f, "{c}"),
                        other => write!(f, "{other:?}"),
                    },
                }
            }
            Self::Type(text) => write!(f, "type:{text}"),
            Self::Line(text) => write!(f, "line:{text}"),
            Self::Assert(assertion) => fmt::Display::fmt(assertion, f),
        }
    }
}

impl FromStr for ScriptEvent {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (kind, value) = s
            .split_once(':')
            .ok_or_else(|| ShellError::config(format!("Invalid event '{s}', expected KIND:VALUE")))?;
        match kind.trim().to_lowercase().as_str() {
            "key" => parse_key(value.trim()).map(Self::Key),
            "type" => Ok(Self::Type(value.to_string())),
            "line" => Ok(Self::Line(value.to_string())),
            "assert" => value.parse().map(Self::Assert),
            other => Err(ShellError::config(format!(
                "Unknown event kind '{other}', expected key, type, line or assert"
            ))),
        }
    }
}

/// Parses `enter`, `x`, `ctrl+c` or `shift+tab`.
fn parse_key(value: &str) -> Result<KeyEvent> {
    let mut parts: Vec<&str> = value.split('+').collect();
    let name = parts.pop().unwrap_or_default();

    let mut modifiers = KeyModifiers::NONE;
    for part in parts {
        let lowered = part.trim().to_lowercase();
        let (_, modifier) = MODIFIERS
            .iter()
            .find(|(known, _)| *known == lowered)
            .ok_or_else(|| ShellError::config(format!("Unknown modifier '{part}', expected ctrl, alt or shift")))?;
        modifiers |= *modifier;
    }

    let lowered = name.to_lowercase();
    if let Some((_, code)) = NAMED_KEYS.iter().find(|(known, _)| *known == lowered) {
        return Ok(KeyEvent::new(*code, modifiers));
    }
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(KeyEvent::new(KeyCode::Char(c), modifiers)),
        _ => Err(ShellError::config(format!(
            "Unknown key '{name}', expected a single character or a key name such as enter or tab"
        ))),
    }
}

/// Parses a whole script. A line may hold several comma-separated events;
/// if that fails, a `type:` or `line:` line is taken whole so its text can
/// contain commas.
pub fn parse_script(input: &str) -> Result<Vec<ScriptEvent>> {
    let mut events = Vec::new();
    for line in input.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let split: Result<Vec<ScriptEvent>> = line
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect();
        match split {
            Ok(parsed) => events.extend(parsed),
            Err(err) => match line.parse::<ScriptEvent>() {
                Ok(event @ (ScriptEvent::Type(_) | ScriptEvent::Line(_))) => events.push(event),
                _ => return Err(err),
            },
        }
    }
    Ok(events)
}
