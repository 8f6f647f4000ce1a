//! Flow steps.
//!
//! A [`ComponentSpec`] pairs a step identity (id, display name, `next`
//! function) with the kind of input it collects. Executing a step either
//! binds its accepted preset straight away or renders the component, reads
//! until a valid value is committed and writes a one-line summary.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use super::select::{SelectItem, Selector};
use super::{FlowContext, FlowValue, ResultMode};
use crate::error::{Result, ShellError};
use crate::terminal::line::{LineEvent, LineReader};
use crate::terminal::Terminal;

/// Chooses the step that follows, or `None` to end the flow.
pub type NextFn = Arc<dyn Fn(&FlowContext) -> Option<String> + Send + Sync>;

/// The kind of input a step collects.
#[derive(Debug, Clone)]
pub enum ComponentKind {
    StringInput {
        mask: Option<char>,
        pattern: Option<Regex>,
    },
    PathInput,
    SingleSelect {
        items: Vec<SelectItem>,
        default_select: Option<String>,
    },
    MultiSelect {
        items: Vec<SelectItem>,
    },
    Confirmation,
}

/// One step of a flow.
#[derive(Clone)]
pub struct ComponentSpec {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) kind: ComponentKind,
    pub(crate) default_value: Option<String>,
    pub(crate) result_value: Option<String>,
    pub(crate) result_values: Option<Vec<String>>,
    pub(crate) result_mode: Option<ResultMode>,
    pub(crate) next: Option<NextFn>,
}

impl fmt::Debug for ComponentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentSpec")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("result_mode", &self.result_mode)
            .field("next", &self.next.is_some())
            .finish()
    }
}

impl ComponentSpec {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    pub fn result_mode(&self) -> Option<ResultMode> {
        self.result_mode
    }

    pub(crate) fn next_fn(&self) -> Option<&NextFn> {
        self.next.as_ref()
    }

    /// The preset value in the shape this step binds, if one was given.
    pub(crate) fn preset(&self) -> Option<FlowValue> {
        match &self.kind {
            ComponentKind::StringInput { .. } | ComponentKind::SingleSelect { .. } => {
                self.result_value.clone().map(FlowValue::Text)
            }
            ComponentKind::PathInput => self.result_value.as_ref().map(|v| FlowValue::Path(PathBuf::from(v))),
            ComponentKind::MultiSelect { .. } => self
                .result_values
                .clone()
                .or_else(|| self.result_value.clone().map(|v| vec![v]))
                .map(FlowValue::List),
            ComponentKind::Confirmation => self
                .result_value
                .as_deref()
                .and_then(parse_confirmation)
                .map(FlowValue::Bool),
        }
    }

    /// True when the step binds its preset without reading input.
    pub(crate) fn is_accepted(&self) -> bool {
        self.result_mode == Some(ResultMode::Accept) && self.preset().is_some()
    }

    /// Runs the step against the terminal and returns the value to bind.
    pub(crate) fn execute(&self, terminal: &mut dyn Terminal) -> Result<FlowValue> {
        if let (Some(ResultMode::Accept), Some(value)) = (self.result_mode, self.preset()) {
            debug!(step = %self.id, "Accepted preset value");
            return Ok(value);
        }

        // A verified preset is offered as the default.
        let default = match self.result_mode {
            Some(ResultMode::Verify) => self.result_value.clone().or_else(|| self.default_value.clone()),
            _ => self.default_value.clone(),
        };

        let (value, shown) = match &self.kind {
            ComponentKind::StringInput { mask, pattern } => {
                let text = self.read_text(terminal, default.as_deref(), *mask, pattern.as_ref())?;
                let shown = match mask {
                    Some(mask) => std::iter::repeat(*mask).take(text.chars().count()).collect(),
                    None => text.clone(),
                };
                (FlowValue::Text(text), shown)
            }
            ComponentKind::PathInput => {
                let path = self.read_path(terminal, default.as_deref())?;
                let shown = path.display().to_string();
                (FlowValue::Path(path), shown)
            }
            ComponentKind::SingleSelect {
                items,
                default_select,
            } => {
                let mut selector = Selector::new(items.clone(), false);
                if let Some(name) = default_select.as_deref().or(default.as_deref()) {
                    selector.highlight(name);
                }
                selector.run(&self.header(), terminal)?;
                let item = selector
                    .current()
                    .ok_or_else(|| ShellError::invalid_flow(format!("step '{}' has no selectable item", self.id)))?;
                let value = item.item().to_string();
                (FlowValue::Text(value.clone()), value)
            }
            ComponentKind::MultiSelect { items } => {
                let mut selector = Selector::new(items.clone(), true);
                if let Some(checked) = self.default_checks() {
                    selector.check_only(&checked);
                }
                selector.run(&self.header(), terminal)?;
                let values = selector.checked_values();
                let shown = values.join(", ");
                (FlowValue::List(values), shown)
            }
            ComponentKind::Confirmation => {
                let fallback = default.as_deref().and_then(parse_confirmation).unwrap_or(true);
                let answer = self.read_confirmation(terminal, fallback)?;
                (FlowValue::Bool(answer), if answer { "yes" } else { "no" }.to_string())
            }
        };

        terminal.write_line(&format!("{} {}", self.name, shown))?;
        debug!(step = %self.id, "Step committed");
        Ok(value)
    }

    /// Items a multi selector opens with checked: the verified preset, else
    /// the comma-separated default value.
    fn default_checks(&self) -> Option<Vec<String>> {
        let verified = match (self.result_mode, self.preset()) {
            (Some(ResultMode::Verify), Some(FlowValue::List(values))) => Some(values),
            _ => None,
        };
        verified.or_else(|| {
            self.default_value
                .as_deref()
                .map(|d| d.split(',').map(|v| v.trim().to_string()).filter(|v| !v.is_empty()).collect())
        })
    }

    fn header(&self) -> String {
        format!("? {}", self.name)
    }

    fn prompt(&self, default: Option<&str>) -> String {
        match default {
            Some(default) => format!("? {} [Default {}] ", self.name, default),
            None => format!("? {} ", self.name),
        }
    }

    /// Reads one submitted line. Interrupt cancels the step, end of input
    /// terminates it.
    fn read_line(&self, terminal: &mut dyn Terminal, prompt: &str, mask: Option<char>) -> Result<String> {
        match LineReader::new(prompt).mask(mask).transient().read(terminal)? {
            LineEvent::Submitted(text) => Ok(text),
            LineEvent::Interrupted { .. } => Err(ShellError::Cancelled),
            LineEvent::EndOfInput => Err(ShellError::Terminated),
        }
    }

    fn read_text(
        &self,
        terminal: &mut dyn Terminal,
        default: Option<&str>,
        mask: Option<char>,
        pattern: Option<&Regex>,
    ) -> Result<String> {
        let prompt = self.prompt(default);
        loop {
            let text = self.read_line(terminal, &prompt, mask)?;
            let value = match (text.is_empty(), default) {
                (true, Some(default)) => default.to_string(),
                _ => text,
            };
            match pattern {
                Some(pattern) if !pattern.is_match(&value) => {
                    terminal.write_line(&format!("Value does not match pattern {}", pattern.as_str()))?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn read_path(&self, terminal: &mut dyn Terminal, default: Option<&str>) -> Result<PathBuf> {
        let prompt = self.prompt(default);
        loop {
            let text = self.read_line(terminal, &prompt, None)?;
            match (text.trim(), default) {
                ("", Some(default)) => return Ok(PathBuf::from(default)),
                ("", None) => terminal.write_line("Path may not be empty")?,
                (text, _) => return Ok(PathBuf::from(text)),
            }
        }
    }

    fn read_confirmation(&self, terminal: &mut dyn Terminal, default: bool) -> Result<bool> {
        let hint = if default { "(Y/n)" } else { "(y/N)" };
        let prompt = format!("? {} {} ", self.name, hint);
        loop {
            let text = self.read_line(terminal, &prompt, None)?;
            if text.trim().is_empty() {
                return Ok(default);
            }
            match parse_confirmation(&text) {
                Some(answer) => return Ok(answer),
                None => terminal.write_line("Please answer y or n")?,
            }
        }
    }
}

pub(super) fn parse_confirmation(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" => Some(true),
        "n" | "no" | "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::channel::ChannelTerminal;
    use crate::terminal::TerminalEvent;
    use crossterm::event::KeyCode;

    fn spec(kind: ComponentKind) -> ComponentSpec {
        ComponentSpec {
            id: "id".to_string(),
            name: "Name".to_string(),
            kind,
            default_value: None,
            result_value: None,
            result_values: None,
            result_mode: None,
            next: None,
        }
    }

    fn string_input() -> ComponentKind {
        ComponentKind::StringInput {
            mask: None,
            pattern: None,
        }
    }

    #[test]
    fn test_accept_preset_skips_terminal() {
        let (mut terminal, feeder) = ChannelTerminal::new();
        drop(feeder);
        let mut step = spec(string_input());
        step.result_value = Some("given".to_string());
        step.result_mode = Some(ResultMode::Accept);

        assert_eq!(step.execute(&mut terminal).unwrap(), FlowValue::Text("given".to_string()));
        assert_eq!(terminal.events_read(), 0);
    }

    #[test]
    fn test_verify_offers_preset_as_default() {
        let (mut terminal, feeder) = ChannelTerminal::new();
        let output = terminal.output();
        feeder.enter().unwrap();
        let mut step = spec(string_input());
        step.result_value = Some("given".to_string());
        step.result_mode = Some(ResultMode::Verify);

        assert_eq!(step.execute(&mut terminal).unwrap(), FlowValue::Text("given".to_string()));
        assert_eq!(output.lines(), vec!["Name given"]);
    }

    #[test]
    fn test_pattern_reprompts() {
        let (mut terminal, feeder) = ChannelTerminal::new();
        let output = terminal.output();
        feeder.line("abc").unwrap();
        feeder.line("123").unwrap();
        let step = spec(ComponentKind::StringInput {
            mask: None,
            pattern: Some(Regex::new("^[0-9]+$").unwrap()),
        });

        assert_eq!(step.execute(&mut terminal).unwrap(), FlowValue::Text("123".to_string()));
        assert!(output.contains("Value does not match pattern ^[0-9]+$"));
    }

    #[test]
    fn test_masked_summary() {
        let (mut terminal, feeder) = ChannelTerminal::new();
        let output = terminal.output();
        feeder.line("secret").unwrap();
        let step = spec(ComponentKind::StringInput {
            mask: Some('*'),
            pattern: None,
        });

        assert_eq!(step.execute(&mut terminal).unwrap(), FlowValue::Text("secret".to_string()));
        assert_eq!(output.lines(), vec!["Name ******"]);
    }

    #[test]
    fn test_path_requires_value() {
        let (mut terminal, feeder) = ChannelTerminal::new();
        let output = terminal.output();
        feeder.enter().unwrap();
        feeder.line("fakedir").unwrap();
        let step = spec(ComponentKind::PathInput);

        assert_eq!(
            step.execute(&mut terminal).unwrap(),
            FlowValue::Path(PathBuf::from("fakedir"))
        );
        assert!(output.contains("Path may not be empty"));
    }

    #[test]
    fn test_confirmation() {
        let (mut terminal, feeder) = ChannelTerminal::new();
        feeder.line("maybe").unwrap();
        feeder.line("n").unwrap();
        feeder.enter().unwrap();
        let step = spec(ComponentKind::Confirmation);

        assert_eq!(step.execute(&mut terminal).unwrap(), FlowValue::Bool(false));
        assert_eq!(step.execute(&mut terminal).unwrap(), FlowValue::Bool(true));
    }

    #[test]
    fn test_single_select_default() {
        let (mut terminal, feeder) = ChannelTerminal::new();
        feeder.enter().unwrap();
        let step = spec(ComponentKind::SingleSelect {
            items: vec![SelectItem::of("key1", "value1"), SelectItem::of("key2", "value2")],
            default_select: Some("key2".to_string()),
        });

        assert_eq!(step.execute(&mut terminal).unwrap(), FlowValue::Text("value2".to_string()));
    }

    #[test]
    fn test_signals_propagate() {
        let (mut terminal, feeder) = ChannelTerminal::new();
        feeder.text("half").unwrap();
        feeder.send(TerminalEvent::Interrupt).unwrap();
        let step = spec(string_input());
        assert!(matches!(step.execute(&mut terminal), Err(ShellError::Cancelled)));

        feeder.key(KeyCode::Char('x')).unwrap();
        drop(feeder);
        assert!(matches!(step.execute(&mut terminal), Err(ShellError::Terminated)));
    }

    #[test]
    fn test_multi_verify_prechecks_preset() {
        let (mut terminal, feeder) = ChannelTerminal::new();
        let output = terminal.output();
        feeder.enter().unwrap();
        let mut step = spec(ComponentKind::MultiSelect {
            items: vec![
                SelectItem::of("key1", "value1").selected(true),
                SelectItem::of("key2", "value2"),
            ],
        });
        step.result_values = Some(vec!["value2".to_string()]);
        step.result_mode = Some(ResultMode::Verify);

        assert_eq!(
            step.execute(&mut terminal).unwrap(),
            FlowValue::List(vec!["value2".to_string()])
        );
        assert_eq!(output.lines().last().map(String::as_str), Some("Name value2"));
    }

    #[test]
    fn test_multi_default_value_prechecks_items() {
        let (mut terminal, feeder) = ChannelTerminal::new();
        feeder.enter().unwrap();
        let mut step = spec(ComponentKind::MultiSelect {
            items: vec![
                SelectItem::of("key1", "value1"),
                SelectItem::of("key2", "value2"),
                SelectItem::of("key3", "value3"),
            ],
        });
        step.default_value = Some("key1, value3".to_string());

        assert_eq!(
            step.execute(&mut terminal).unwrap(),
            FlowValue::List(vec!["value1".to_string(), "value3".to_string()])
        );
    }

    #[test]
    fn test_multi_preset_falls_back_to_single_value() {
        let mut step = spec(ComponentKind::MultiSelect { items: Vec::new() });
        step.result_value = Some("one".to_string());
        assert_eq!(step.preset(), Some(FlowValue::List(vec!["one".to_string()])));
        step.result_values = Some(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            step.preset(),
            Some(FlowValue::List(vec!["a".to_string(), "b".to_string()]))
        );
    }
}
