//! Command registrations.
//!
//! A [`CommandRegistration`] binds a (possibly multi-word) command name to its
//! options and an invocable target. Registrations are built once with
//! [`CommandRegistration::builder`] and are immutable afterwards.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::binding::BoundArguments;
use super::catalog::Registrations;
use super::option::{CommandOption, CommandOptionBuilder};
use super::output::CommandOutput;
use crate::error::{Result, ShellError};
use crate::terminal::Terminal;

/// Group used for registrations that do not name one.
pub const DEFAULT_GROUP: &str = "Default";

/// Invocable target of a command.
pub type CommandTarget =
    Arc<dyn Fn(&mut CommandContext<'_>) -> anyhow::Result<CommandOutput> + Send + Sync>;

/// Context provided to command targets.
pub struct CommandContext<'a> {
    /// Full command name that was matched.
    pub command: &'a str,
    /// Arguments bound against the command's options.
    pub arguments: &'a BoundArguments,
    /// The terminal, lent to the command for the duration of the invocation.
    pub terminal: &'a mut dyn Terminal,
    /// Snapshot of the catalog taken for this invocation.
    pub registrations: &'a Registrations,
}

/// An immutable command registration.
#[derive(Clone)]
pub struct CommandRegistration {
    name: String,
    words: Vec<String>,
    description: Option<String>,
    group: Option<String>,
    hidden: bool,
    options: Vec<CommandOption>,
    target: CommandTarget,
}

impl CommandRegistration {
    /// Starts building a new registration.
    pub fn builder() -> CommandRegistrationBuilder {
        CommandRegistrationBuilder::default()
    }

    /// Full command name, words separated by a single space.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The words making up the command name.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Group name, `"Default"` when none (or a blank one) was given.
    pub fn group(&self) -> &str {
        match self.group.as_deref() {
            Some(group) if !group.trim().is_empty() => group,
            _ => DEFAULT_GROUP,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Options in declaration order.
    pub fn options(&self) -> &[CommandOption] {
        &self.options
    }

    /// Finds the option answering to a long name, with its declaration index.
    pub fn find_long(&self, name: &str) -> Option<(usize, &CommandOption)> {
        self.options.iter().enumerate().find(|(_, o)| o.has_long_name(name))
    }

    /// Finds the option answering to a short name, with its declaration index.
    pub fn find_short(&self, name: char) -> Option<(usize, &CommandOption)> {
        self.options.iter().enumerate().find(|(_, o)| o.has_short_name(name))
    }

    /// Invokes the target.
    pub fn invoke(&self, ctx: &mut CommandContext<'_>) -> anyhow::Result<CommandOutput> {
        (self.target)(ctx)
    }
}

impl fmt::Debug for CommandRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistration")
            .field("name", &self.name)
            .field("group", &self.group())
            .field("hidden", &self.hidden)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Builder for [`CommandRegistration`].
#[derive(Default)]
pub struct CommandRegistrationBuilder {
    name: String,
    description: Option<String>,
    group: Option<String>,
    hidden: bool,
    options: Vec<CommandOption>,
    target: Option<CommandTarget>,
}

impl CommandRegistrationBuilder {
    /// Sets the command name. Extra whitespace between words is collapsed.
    pub fn command(mut self, name: impl AsRef<str>) -> Self {
        self.name = name.as_ref().split_whitespace().collect::<Vec<_>>().join(" ");
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Adds an already built option.
    pub fn with_option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    /// Adds an option configured through a builder closure.
    pub fn option(self, configure: impl FnOnce(CommandOptionBuilder) -> CommandOptionBuilder) -> Self {
        let option = configure(CommandOption::builder()).build();
        self.with_option(option)
    }

    /// Sets the function invoked when the command runs.
    pub fn target<F>(mut self, target: F) -> Self
    where
        F: Fn(&mut CommandContext<'_>) -> anyhow::Result<CommandOutput> + Send + Sync + 'static,
    {
        self.target = Some(Arc::new(target));
        self
    }

    /// Validates and builds the registration.
    pub fn build(self) -> Result<CommandRegistration> {
        if self.name.is_empty() {
            return Err(ShellError::invalid_registration("command name may not be empty"));
        }

        let target = self.target.ok_or_else(|| {
            ShellError::invalid_registration(format!("command '{}' has no target", self.name))
        })?;

        // Long and short names live in separate namespaces: `--a` and `-a`
        // may belong to different options.
        let mut long_seen: HashSet<&str> = HashSet::new();
        let mut short_seen: HashSet<char> = HashSet::new();
        for option in &self.options {
            if option.long_names().is_empty() && option.short_names().is_empty() {
                return Err(ShellError::invalid_registration(format!(
                    "command '{}' has an option without names",
                    self.name
                )));
            }
            let duplicate = option
                .long_names()
                .iter()
                .find(|n| !long_seen.insert(n.as_str()))
                .map(|n| format!("--{n}"))
                .or_else(|| {
                    option
                        .short_names()
                        .iter()
                        .find(|c| !short_seen.insert(**c))
                        .map(|c| format!("-{c}"))
                });
            if let Some(name) = duplicate {
                return Err(ShellError::invalid_registration(format!(
                    "command '{}' declares option '{}' more than once",
                    self.name, name
                )));
            }
        }

        Ok(CommandRegistration {
            words: self.name.split(' ').map(String::from).collect(),
            name: self.name,
            description: self.description,
            group: self.group,
            hidden: self.hidden,
            options: self.options,
            target,
        })
    }
}
