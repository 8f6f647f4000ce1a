//! The shell dispatch loop.
//!
//! Each iteration reads one input line, matches the longest registered
//! command whose words prefix the input, binds the remaining words to the
//! command's options and invokes it. Every outcome goes to the result
//! handler, which alone decides whether the loop continues.

pub mod input;
pub mod result;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, info, warn};

use crate::commands::binding::bind;
use crate::commands::catalog::{find_command, CommandCatalog};
use crate::commands::registration::CommandContext;
use crate::completion::{self, CompletionContext, CompletionProposal, CompletionResolver, DefaultCompletionResolver};
use crate::error::{Result, ShellError};
use crate::terminal::Terminal;

pub use input::{Input, InputProvider, ScriptedInputProvider, TerminalInputProvider};
pub use result::{DefaultResultHandler, DispatchOutcome, HandlerAction, ResultHandler};

/// Comment markers used when none are configured.
pub const DEFAULT_COMMENT_MARKERS: [&str; 2] = ["//", "#"];

/// Command shell over a catalog.
pub struct Shell {
    catalog: Arc<dyn CommandCatalog>,
    handler: Arc<dyn ResultHandler>,
    resolvers: Vec<Arc<dyn CompletionResolver>>,
    comment_markers: Vec<String>,
}

impl Shell {
    /// Creates a shell with the default result handler and completion resolver.
    pub fn new(catalog: Arc<dyn CommandCatalog>) -> Self {
        Self {
            catalog,
            handler: Arc::new(DefaultResultHandler),
            resolvers: vec![Arc::new(DefaultCompletionResolver)],
            comment_markers: DEFAULT_COMMENT_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn with_result_handler(mut self, handler: Arc<dyn ResultHandler>) -> Self {
        self.handler = handler;
        self
    }

    /// Replaces the completion resolvers.
    pub fn with_completion_resolvers(mut self, resolvers: Vec<Arc<dyn CompletionResolver>>) -> Self {
        self.resolvers = resolvers;
        self
    }

    pub fn with_comment_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comment_markers = markers
            .into_iter()
            .map(Into::into)
            .filter(|m: &String| !m.is_empty())
            .collect();
        self
    }

    /// Runs the loop until the input ends or the handler asks to terminate.
    pub fn run(&self, input: &mut dyn InputProvider, terminal: &mut dyn Terminal) -> Result<()> {
        info!("Shell loop started");

        loop {
            let outcome = match input.read_input(terminal) {
                Ok(Some(line)) => match self.evaluate(&line, terminal) {
                    Ok(outcome) => outcome,
                    Err(ShellError::Terminated) => {
                        debug!("Command requested termination");
                        break;
                    }
                    Err(err) => DispatchOutcome::Failed(err),
                },
                Ok(None) => {
                    debug!("End of input");
                    break;
                }
                Err(ShellError::Cancelled) => {
                    debug!("Read cancelled");
                    continue;
                }
                Err(ShellError::Terminated) => {
                    debug!("Read terminated");
                    break;
                }
                Err(err) => DispatchOutcome::Failed(err),
            };

            match self.handler.handle(&outcome, terminal) {
                Ok(HandlerAction::Continue) => {}
                Ok(HandlerAction::Terminate) | Err(ShellError::Terminated) => {
                    debug!("Result handler requested termination");
                    break;
                }
                Err(err) => warn!("Result handler failed: {err}"),
            }
        }

        info!("Shell loop finished");
        Ok(())
    }

    /// Evaluates one input line.
    ///
    /// Failures are part of the returned outcome. The only error returned is
    /// [`ShellError::Terminated`], when the command itself ends the shell.
    pub fn evaluate(&self, input: &Input, terminal: &mut dyn Terminal) -> Result<DispatchOutcome> {
        if input.is_empty() {
            return Ok(DispatchOutcome::Empty);
        }
        if self.is_comment(input.raw()) {
            return Ok(DispatchOutcome::Comment);
        }

        let registrations = self.catalog.registrations();
        let Some(registration) = find_command(&registrations, input.words()) else {
            debug!(input = input.raw(), "No command matched");
            return Ok(DispatchOutcome::Failed(ShellError::command_not_found(input.raw())));
        };
        let command = registration.name().to_string();

        let arguments = match bind(registration, &input.words()[registration.words().len()..]) {
            Ok(arguments) => arguments,
            Err(source) => {
                return Ok(DispatchOutcome::Failed(ShellError::OptionBinding { command, source }));
            }
        };

        debug!(command = %command, "Invoking command");
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut ctx = CommandContext {
                command: &command,
                arguments: &arguments,
                terminal: &mut *terminal,
                registrations: &registrations,
            };
            registration.invoke(&mut ctx)
        }));

        match result {
            Ok(Ok(output)) => Ok(DispatchOutcome::Completed { command, output }),
            Ok(Err(err)) => match err.downcast_ref::<ShellError>() {
                Some(ShellError::Cancelled) => Ok(DispatchOutcome::Cancelled { command }),
                Some(ShellError::Terminated) => Err(ShellError::Terminated),
                _ => Ok(DispatchOutcome::Failed(ShellError::Invocation {
                    command,
                    source: err,
                })),
            },
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                warn!(command = %command, "Command panicked: {message}");
                Ok(DispatchOutcome::Failed(ShellError::Invocation {
                    command,
                    source: anyhow!("command panicked: {message}"),
                }))
            }
        }
    }

    /// Completes the word under the cursor.
    pub fn complete(&self, context: &CompletionContext) -> Vec<CompletionProposal> {
        completion::complete(&self.catalog.registrations(), &self.resolvers, context)
    }

    fn is_comment(&self, raw: &str) -> bool {
        let trimmed = raw.trim_start();
        self.comment_markers.iter().any(|m| trimmed.starts_with(m.as_str()))
    }
}
