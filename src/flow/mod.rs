//! Component flows.
//!
//! A [`ComponentFlow`] runs a sequence of interactive steps against a
//! terminal, binding each committed value into a shared [`FlowContext`].
//! Steps run in declaration order unless a step supplies its own `next`
//! function, which picks the following step from the context so far.
//!
//! ```ignore
//! let flow = ComponentFlow::builder()
//!     .with_string_input("name", |s| s.name("Name").default_value("anonymous"))
//!     .with_single_item_selector("color", |s| {
//!         s.name("Color").select_items([("Red", "red"), ("Blue", "blue")])
//!     })
//!     .build()?;
//! let context = flow.run(terminal)?;
//! ```

pub mod component;
pub mod select;

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, info};

use crate::error::{Result, ShellError};
use crate::terminal::Terminal;

pub use component::{ComponentKind, ComponentSpec, NextFn};
pub use select::SelectItem;

/// How a preset result is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultMode {
    /// Bind the preset without rendering the step.
    Accept,
    /// Render the step with the preset offered as the default.
    Verify,
}

/// A value bound by a flow step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FlowValue {
    Text(String),
    Path(PathBuf),
    List(Vec<String>),
    Bool(bool),
}

impl fmt::Display for FlowValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::List(values) => f.write_str(&values.join(", ")),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

/// Values bound so far, keyed by step id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FlowContext {
    values: BTreeMap<String, FlowValue>,
}

impl FlowContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, value: FlowValue) -> Option<FlowValue> {
        self.values.insert(id.into(), value)
    }

    pub fn get(&self, id: &str) -> Option<&FlowValue> {
        self.values.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    /// Text bound by a string input or single selector.
    pub fn get_text(&self, id: &str) -> Option<&str> {
        match self.values.get(id) {
            Some(FlowValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn get_path(&self, id: &str) -> Option<&Path> {
        match self.values.get(id) {
            Some(FlowValue::Path(path)) => Some(path),
            _ => None,
        }
    }

    pub fn get_list(&self, id: &str) -> Option<&[String]> {
        match self.values.get(id) {
            Some(FlowValue::List(values)) => Some(values),
            _ => None,
        }
    }

    pub fn get_bool(&self, id: &str) -> Option<bool> {
        match self.values.get(id) {
            Some(FlowValue::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlowValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A validated sequence of steps.
#[derive(Debug, Clone)]
pub struct ComponentFlow {
    steps: Vec<ComponentSpec>,
}

impl ComponentFlow {
    pub fn builder() -> ComponentFlowBuilder {
        ComponentFlowBuilder::default()
    }

    pub fn steps(&self) -> &[ComponentSpec] {
        &self.steps
    }

    /// Runs the flow from its first step with an empty context.
    pub fn run(&self, terminal: &mut dyn Terminal) -> Result<FlowContext> {
        self.run_with(terminal, FlowContext::new())
    }

    /// Runs the flow, starting from `context`.
    ///
    /// Cancellation and termination from a step end the flow with that
    /// error. A `next` function naming an undeclared step fails with
    /// [`ShellError::FlowNavigation`]. Revisiting a step with an unchanged
    /// context through accepted steps only fails with
    /// [`ShellError::InvalidFlow`], as the flow would never end.
    pub fn run_with(&self, terminal: &mut dyn Terminal, mut context: FlowContext) -> Result<FlowContext> {
        info!(steps = self.steps.len(), "Flow started");

        // States reached since the last step that read input.
        let mut unattended: HashSet<(usize, FlowContext)> = HashSet::new();
        let mut index = 0;
        while let Some(step) = self.steps.get(index) {
            debug!(step = step.id(), "Running step");
            if step.is_accepted() {
                if !unattended.insert((index, context.clone())) {
                    return Err(ShellError::invalid_flow(format!(
                        "step '{}' is revisited without input and would loop forever",
                        step.id()
                    )));
                }
            } else {
                unattended.clear();
            }
            let value = step.execute(terminal)?;
            context.insert(step.id(), value);

            let next = match step.next_fn() {
                Some(next) => next(&context),
                None => self.steps.get(index + 1).map(|s| s.id().to_string()),
            };
            let Some(next) = next else {
                break;
            };
            index = self
                .position(&next)
                .ok_or_else(|| ShellError::FlowNavigation {
                    from: step.id().to_string(),
                    to: next.clone(),
                })?;
        }

        info!(bound = context.len(), "Flow finished");
        Ok(context)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id() == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepKind {
    StringInput,
    PathInput,
    SingleSelect,
    MultiSelect,
    Confirmation,
}

/// Settings for one step, used inside [`ComponentFlowBuilder`] closures.
#[derive(Default)]
pub struct StepBuilder {
    name: Option<String>,
    default_value: Option<String>,
    result_value: Option<String>,
    result_values: Option<Vec<String>>,
    result_mode: Option<ResultMode>,
    next: Option<NextFn>,
    mask: Option<char>,
    pattern: Option<String>,
    items: Vec<SelectItem>,
    default_select: Option<String>,
}

impl StepBuilder {
    /// Display name used in prompts and summaries. Defaults to the id.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Value used when the user submits empty input.
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn result_value(mut self, value: impl Into<String>) -> Self {
        self.result_value = Some(value.into());
        self
    }

    /// Preset values for a multi selector.
    pub fn result_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.result_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn result_mode(mut self, mode: ResultMode) -> Self {
        self.result_mode = Some(mode);
        self
    }

    /// Picks the following step from the context. Returning `None` ends the flow.
    pub fn next<F>(mut self, next: F) -> Self
    where
        F: Fn(&FlowContext) -> Option<String> + Send + Sync + 'static,
    {
        self.next = Some(Arc::new(next));
        self
    }

    /// Echoes typed characters as `mask`. String inputs only.
    pub fn mask(mut self, mask: char) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Regular expression the value must match. String inputs only.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Adds `(name, value)` items to a selector, in order.
    pub fn select_items<I, K, V>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.items
            .extend(items.into_iter().map(|(name, value)| SelectItem::of(name, value)));
        self
    }

    pub fn select_item(mut self, item: SelectItem) -> Self {
        self.items.push(item);
        self
    }

    /// Name of the item highlighted when a single selector opens.
    pub fn default_select(mut self, name: impl Into<String>) -> Self {
        self.default_select = Some(name.into());
        self
    }

    fn build(self, id: String, kind: StepKind) -> Result<ComponentSpec> {
        let selector = matches!(kind, StepKind::SingleSelect | StepKind::MultiSelect);
        if !selector && (!self.items.is_empty() || self.default_select.is_some()) {
            return Err(ShellError::invalid_flow(format!(
                "step '{id}' is not a selector but declares select items"
            )));
        }
        if kind != StepKind::StringInput && (self.mask.is_some() || self.pattern.is_some()) {
            return Err(ShellError::invalid_flow(format!(
                "step '{id}' is not a string input but declares a mask or pattern"
            )));
        }

        if kind == StepKind::Confirmation {
            let unparseable = [&self.result_value, &self.default_value]
                .into_iter()
                .flatten()
                .find(|v| component::parse_confirmation(v).is_none());
            if let Some(value) = unparseable {
                return Err(ShellError::invalid_flow(format!(
                    "confirmation '{id}' has a preset '{value}' that is neither yes nor no"
                )));
            }
        }

        let pattern = self
            .pattern
            .map(|p| {
                Regex::new(&p).map_err(|e| ShellError::invalid_flow(format!("step '{id}' has an invalid pattern: {e}")))
            })
            .transpose()?;

        let kind = match kind {
            StepKind::StringInput => ComponentKind::StringInput {
                mask: self.mask,
                pattern,
            },
            StepKind::PathInput => ComponentKind::PathInput,
            StepKind::SingleSelect => ComponentKind::SingleSelect {
                items: self.items,
                default_select: self.default_select,
            },
            StepKind::MultiSelect => ComponentKind::MultiSelect { items: self.items },
            StepKind::Confirmation => ComponentKind::Confirmation,
        };

        let spec = ComponentSpec {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            kind,
            default_value: self.default_value,
            result_value: self.result_value,
            result_values: self.result_values,
            result_mode: self.result_mode,
            next: self.next,
        };

        let accepted = spec.is_accepted();
        let selectable = match &spec.kind {
            ComponentKind::SingleSelect { items, .. } | ComponentKind::MultiSelect { items } => {
                items.iter().any(SelectItem::is_enabled)
            }
            _ => true,
        };
        if !selectable && !accepted {
            return Err(ShellError::invalid_flow(format!(
                "selector '{}' has no selectable items",
                spec.id
            )));
        }
        Ok(spec)
    }
}

/// Collects steps and validates them into a [`ComponentFlow`].
#[derive(Default)]
pub struct ComponentFlowBuilder {
    steps: Vec<(String, StepKind, StepBuilder)>,
}

impl ComponentFlowBuilder {
    pub fn with_string_input<F>(self, id: impl Into<String>, configure: F) -> Self
    where
        F: FnOnce(StepBuilder) -> StepBuilder,
    {
        self.step(id.into(), StepKind::StringInput, configure)
    }

    pub fn with_path_input<F>(self, id: impl Into<String>, configure: F) -> Self
    where
        F: FnOnce(StepBuilder) -> StepBuilder,
    {
        self.step(id.into(), StepKind::PathInput, configure)
    }

    pub fn with_single_item_selector<F>(self, id: impl Into<String>, configure: F) -> Self
    where
        F: FnOnce(StepBuilder) -> StepBuilder,
    {
        self.step(id.into(), StepKind::SingleSelect, configure)
    }

    pub fn with_multi_item_selector<F>(self, id: impl Into<String>, configure: F) -> Self
    where
        F: FnOnce(StepBuilder) -> StepBuilder,
    {
        self.step(id.into(), StepKind::MultiSelect, configure)
    }

    pub fn with_confirmation<F>(self, id: impl Into<String>, configure: F) -> Self
    where
        F: FnOnce(StepBuilder) -> StepBuilder,
    {
        self.step(id.into(), StepKind::Confirmation, configure)
    }

    fn step<F>(mut self, id: String, kind: StepKind, configure: F) -> Self
    where
        F: FnOnce(StepBuilder) -> StepBuilder,
    {
        self.steps.push((id, kind, configure(StepBuilder::default())));
        self
    }

    /// Validates the steps. Duplicate or empty ids, misplaced settings and
    /// selectors with nothing to select fail with [`ShellError::InvalidFlow`].
    pub fn build(self) -> Result<ComponentFlow> {
        let mut seen = HashSet::new();
        let mut steps = Vec::with_capacity(self.steps.len());
        for (id, kind, builder) in self.steps {
            if id.trim().is_empty() {
                return Err(ShellError::invalid_flow("step id must not be empty"));
            }
            if !seen.insert(id.clone()) {
                return Err(ShellError::invalid_flow(format!("duplicate step id '{id}'")));
            }
            steps.push(builder.build(id, kind)?);
        }
        Ok(ComponentFlow { steps })
    }
}
