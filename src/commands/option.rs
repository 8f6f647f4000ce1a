//! Command option definitions.
//!
//! A [`CommandOption`] describes one flag or positional argument of a command.
//! Options are immutable once built; use [`CommandOption::builder`] to create them.

use std::fmt;

/// Declared value type of an option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OptionType {
    /// Plain string value.
    #[default]
    String,
    /// Signed integer value.
    Integer,
    /// Floating point value.
    Float,
    /// Boolean flag, may appear without a value.
    Boolean,
    /// Filesystem path.
    Path,
    /// Sequence of string values.
    List,
}

impl OptionType {
    /// Arity used when the option does not declare one explicitly.
    /// `usize::MAX` as the upper bound means unbounded.
    pub fn default_arity(&self) -> (usize, usize) {
        match self {
            Self::Boolean => (0, 1),
            Self::List => (0, usize::MAX),
            _ => (1, 1),
        }
    }
}

/// Common arity shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionArity {
    Zero,
    ZeroOrOne,
    ExactlyOne,
    ZeroOrMore,
    OneOrMore,
}

impl OptionArity {
    fn bounds(self) -> (usize, usize) {
        match self {
            Self::Zero => (0, 0),
            Self::ZeroOrOne => (0, 1),
            Self::ExactlyOne => (1, 1),
            Self::ZeroOrMore => (0, usize::MAX),
            Self::OneOrMore => (1, usize::MAX),
        }
    }
}

/// Immutable description of one option of a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOption {
    long_names: Vec<String>,
    short_names: Vec<char>,
    description: Option<String>,
    option_type: OptionType,
    required: bool,
    default_value: Option<String>,
    position: Option<usize>,
    arity_min: Option<usize>,
    arity_max: Option<usize>,
}

impl CommandOption {
    /// Starts building a new option.
    pub fn builder() -> CommandOptionBuilder {
        CommandOptionBuilder::default()
    }

    pub fn long_names(&self) -> &[String] {
        &self.long_names
    }

    pub fn short_names(&self) -> &[char] {
        &self.short_names
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Raw default value; parsed when arguments are bound.
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Position index for positional options, `None` for named-only options.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn is_positional(&self) -> bool {
        self.position.is_some()
    }

    pub fn arity_min(&self) -> Option<usize> {
        self.arity_min
    }

    pub fn arity_max(&self) -> Option<usize> {
        self.arity_max
    }

    /// Arity bounds after applying type defaults for unset values.
    pub fn effective_arity(&self) -> (usize, usize) {
        let (type_min, type_max) = self.option_type.default_arity();
        match (self.arity_min, self.arity_max) {
            (None, None) => (type_min, type_max),
            (Some(min), None) => (min, type_max.max(min)),
            (None, Some(max)) => (type_min.min(max), max),
            (Some(min), Some(max)) => (min, max),
        }
    }

    /// Returns true if this option answers to the given long name.
    pub fn has_long_name(&self, name: &str) -> bool {
        self.long_names.iter().any(|n| n == name)
    }

    /// Returns true if this option answers to the given short name.
    pub fn has_short_name(&self, name: char) -> bool {
        self.short_names.contains(&name)
    }

    /// Name as a user would type it: `--long` when there is one, else `-s`.
    pub fn display_name(&self) -> String {
        match (self.long_names.first(), self.short_names.first()) {
            (Some(long), _) => format!("--{long}"),
            (None, Some(short)) => format!("-{short}"),
            (None, None) => String::new(),
        }
    }

    /// Every name of this option, long names first.
    pub fn all_names(&self) -> Vec<String> {
        self.long_names
            .iter()
            .cloned()
            .chain(self.short_names.iter().map(|c| c.to_string()))
            .collect()
    }
}

impl fmt::Display for CommandOption {
    /// Formats as the names a user would type, e.g. `--name, -n`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .long_names
            .iter()
            .map(|n| format!("--{n}"))
            .chain(self.short_names.iter().map(|c| format!("-{c}")))
            .collect();
        f.write_str(&names.join(", "))
    }
}

/// Builder for [`CommandOption`].
#[derive(Debug, Default)]
pub struct CommandOptionBuilder {
    option: CommandOption,
}

impl CommandOptionBuilder {
    pub fn long_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !name.is_empty() && !self.option.long_names.contains(&name) {
                self.option.long_names.push(name);
            }
        }
        self
    }

    pub fn short_names<I>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        for name in names {
            if !self.option.short_names.contains(&name) {
                self.option.short_names.push(name);
            }
        }
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.option.description = Some(description.into());
        self
    }

    pub fn option_type(mut self, option_type: OptionType) -> Self {
        self.option.option_type = option_type;
        self
    }

    pub fn required(mut self) -> Self {
        self.option.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.option.default_value = Some(value.into());
        self
    }

    pub fn position(mut self, position: usize) -> Self {
        self.option.position = Some(position);
        self
    }

    pub fn arity(mut self, min: usize, max: usize) -> Self {
        self.option.arity_min = Some(min);
        self.option.arity_max = Some(max.max(min));
        self
    }

    pub fn arity_kind(mut self, arity: OptionArity) -> Self {
        let (min, max) = arity.bounds();
        self.option.arity_min = Some(min);
        self.option.arity_max = Some(max);
        self
    }

    pub fn build(self) -> CommandOption {
        self.option
    }
}
