//! Headless mode for scripted runs and automation.
//!
//! Runs the shell against a [`ChannelTerminal`] fed from an event script
//! instead of a real terminal. Every non-assertion event is queued up front,
//! the feeder is dropped, and the shell runs until it reads end of input.
//! Assertions are then checked against the captured transcript.

mod output;

pub use output::OutputFormat;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::completion::CompletionContext;
use crate::error::{Result, ShellError};
use crate::shell::{Shell, TerminalInputProvider};
use crate::terminal::channel::ChannelTerminal;
use crate::terminal::script::{parse_script, ScriptEvent};

/// Where the events of a headless run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSource {
    /// Events given directly on the command line.
    Inline(String),
    /// A script file, or stdin for "-".
    Script(String),
}

/// Settings of a headless run.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Prompt shown before each input line.
    pub prompt: String,
    /// Report format.
    pub output_format: OutputFormat,
    /// Stop checking assertions after the first failure.
    pub fail_fast: bool,
    /// Report destination; stdout when unset.
    pub output_file: Option<PathBuf>,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            prompt: "shell:> ".to_string(),
            output_format: OutputFormat::default(),
            fail_fast: false,
            output_file: None,
        }
    }
}

/// Outcome of a headless run.
#[derive(Debug, Clone)]
pub struct HeadlessResult {
    /// Committed terminal lines.
    pub transcript: Vec<String>,
    /// Number of events fed to the terminal.
    pub events_executed: usize,
    /// Wall time of the run.
    pub duration: Duration,
    pub assertions_passed: usize,
    pub assertions_failed: usize,
    /// Description of each failed assertion.
    pub failures: Vec<String>,
}

/// Runs a shell in headless mode.
#[derive(Debug)]
pub struct HeadlessRunner {
    config: HeadlessConfig,
    events: Vec<ScriptEvent>,
}

impl HeadlessRunner {
    pub fn new(config: HeadlessConfig) -> Self {
        Self {
            config,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &HeadlessConfig {
        &self.config
    }

    /// Loads events given inline, separated by commas or newlines.
    pub fn load_events(&mut self, input: &str) -> Result<()> {
        self.events = parse_script(input)?;
        Ok(())
    }

    /// Loads events from a script file, or from stdin when `path` is "-".
    pub fn load_script(&mut self, path: &str) -> Result<()> {
        let content = match path {
            "-" => std::io::read_to_string(std::io::stdin()),
            path => std::fs::read_to_string(path),
        }
        .map_err(|e| ShellError::config(format!("Cannot read event script '{path}': {e}")))?;
        self.load_events(&content)
    }

    /// Runs the loaded events through `shell` and checks the assertions.
    pub fn run(&self, shell: &Shell) -> Result<HeadlessResult> {
        let start_time = Instant::now();
        let (mut terminal, feeder) = ChannelTerminal::new();
        let output = terminal.output();

        let mut events_executed = 0;
        let mut assertions = Vec::new();
        for event in &self.events {
            match event {
                ScriptEvent::Assert(assertion) => assertions.push(assertion),
                event => {
                    debug!(event = %event, "Queueing event");
                    event.feed(&feeder)?;
                    events_executed += 1;
                }
            }
        }
        drop(feeder);

        let completer = |context: &CompletionContext| shell.complete(context);
        let mut input = TerminalInputProvider::new(self.config.prompt.as_str()).completer(&completer);
        shell.run(&mut input, &mut terminal)?;

        let transcript = output.lines();
        let text = output.text();
        let mut assertions_passed = 0;
        let mut failures = Vec::new();
        for assertion in assertions {
            if assertion.check(&text) {
                assertions_passed += 1;
            } else {
                warn!(assertion = %assertion, "Assertion failed");
                failures.push(assertion.to_string());
                if self.config.fail_fast {
                    break;
                }
            }
        }

        info!(
            events = events_executed,
            passed = assertions_passed,
            failed = failures.len(),
            "Headless run finished"
        );
        Ok(HeadlessResult {
            transcript,
            events_executed,
            duration: start_time.elapsed(),
            assertions_passed,
            assertions_failed: failures.len(),
            failures,
        })
    }
}

/// Runs headless mode and writes the report. Returns the process exit code.
pub fn run_headless(shell: &Shell, config: HeadlessConfig, source: &EventSource) -> Result<i32> {
    let mut runner = HeadlessRunner::new(config);
    match source {
        EventSource::Inline(events) => runner.load_events(events)?,
        EventSource::Script(path) => runner.load_script(path)?,
    }

    let result = runner.run(shell)?;
    let report = result.render(runner.config().output_format);

    match &runner.config().output_file {
        Some(path) => std::fs::write(path, &report)
            .map_err(|e| ShellError::internal(format!("Failed to write output file: {e}")))?,
        None => print!("{report}"),
    }

    Ok(if result.assertions_failed > 0 { 1 } else { 0 })
}
