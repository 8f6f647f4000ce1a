//! Reporting dispatch results.
//!
//! The loop hands every outcome, success or failure, to a [`ResultHandler`].
//! Only the handler decides whether the loop goes on.

use tracing::{debug, warn};

use crate::commands::output::CommandOutput;
use crate::error::{Result, ShellError};
use crate::terminal::Terminal;

/// What happened to one input line.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The line had no words.
    Empty,
    /// The line was a comment.
    Comment,
    /// The command ran and produced output.
    Completed {
        command: String,
        output: CommandOutput,
    },
    /// The command was cancelled by the user.
    Cancelled { command: String },
    /// Matching, binding or invocation failed, or the read itself failed.
    Failed(ShellError),
}

/// What the loop should do after a result was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerAction {
    Continue,
    Terminate,
}

/// Reports outcomes and decides whether the shell continues.
pub trait ResultHandler: Send + Sync {
    fn handle(&self, outcome: &DispatchOutcome, terminal: &mut dyn Terminal) -> Result<HandlerAction>;
}

/// Writes output and errors to the terminal; terminates on
/// [`ControlAction::Exit`](crate::commands::ControlAction::Exit).
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResultHandler;

impl ResultHandler for DefaultResultHandler {
    fn handle(&self, outcome: &DispatchOutcome, terminal: &mut dyn Terminal) -> Result<HandlerAction> {
        match outcome {
            DispatchOutcome::Empty | DispatchOutcome::Comment => Ok(HandlerAction::Continue),
            DispatchOutcome::Cancelled { command } => {
                debug!(command = %command, "Command cancelled");
                Ok(HandlerAction::Continue)
            }
            DispatchOutcome::Completed { output, .. } => {
                terminal.write_lines(&output.render())?;
                if output.requests_exit() {
                    return Ok(HandlerAction::Terminate);
                }
                Ok(HandlerAction::Continue)
            }
            DispatchOutcome::Failed(err) => {
                warn!(category = err.category(), "{err}");
                terminal.write_line(&err.to_string())?;
                Ok(HandlerAction::Continue)
            }
        }
    }
}
