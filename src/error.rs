//! Error types for linewise.
//!
//! Defines the main error enum used throughout the shell runtime.

use crate::commands::binding::BindingError;
use thiserror::Error;

/// Main error type for shell operations.
#[derive(Error, Debug)]
pub enum ShellError {
    /// No registered command name is a word-prefix of the input.
    #[error("Command not found: {input}")]
    CommandNotFound { input: String },

    /// Arguments could not be bound to the command's options.
    #[error("Invalid arguments for '{command}': {source}")]
    OptionBinding {
        command: String,
        #[source]
        source: BindingError,
    },

    /// The command target failed. The original cause is kept as the source.
    #[error("Command '{command}' failed: {source}")]
    Invocation {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    /// A flow step pointed at a step id that the flow does not declare.
    #[error("Flow navigation error: step '{from}' continues to unknown step '{to}'")]
    FlowNavigation { from: String, to: String },

    /// A command registration is inconsistent (empty name, duplicate options, ...).
    #[error("Invalid registration: {0}")]
    InvalidRegistration(String),

    /// A flow definition is inconsistent (duplicate ids, empty selectors, ...).
    #[error("Invalid flow: {0}")]
    InvalidFlow(String),

    /// The user aborted the current read or flow step.
    #[error("Operation cancelled")]
    Cancelled,

    /// End of input, or an explicit request to leave the shell.
    #[error("Shell terminated")]
    Terminated,

    /// Configuration errors (invalid config file, bad values, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Terminal I/O errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Internal errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShellError {
    /// Creates a command-not-found error for the raw input line.
    pub fn command_not_found(input: impl Into<String>) -> Self {
        Self::CommandNotFound {
            input: input.into(),
        }
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a terminal error with the given message.
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }

    /// Creates an invalid-registration error with the given message.
    pub fn invalid_registration(msg: impl Into<String>) -> Self {
        Self::InvalidRegistration(msg.into())
    }

    /// Creates an invalid-flow error with the given message.
    pub fn invalid_flow(msg: impl Into<String>) -> Self {
        Self::InvalidFlow(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true for the signals that abort or end a read rather than report a failure.
    pub fn is_signal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Terminated)
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::CommandNotFound { .. } => "Command Not Found",
            Self::OptionBinding { .. } => "Binding Error",
            Self::Invocation { .. } => "Invocation Error",
            Self::InvalidRegistration(_) => "Registration Error",
            Self::FlowNavigation { .. } | Self::InvalidFlow(_) => "Flow Error",
            Self::Cancelled => "Cancelled",
            Self::Terminated => "Terminated",
            Self::Config(_) => "Configuration Error",
            Self::Terminal(_) => "Terminal Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

impl From<std::io::Error> for ShellError {
    fn from(err: std::io::Error) -> Self {
        Self::Terminal(err.to_string())
    }
}

/// Result type alias using ShellError.
pub type Result<T> = std::result::Result<T, ShellError>;
