//! Command-line arguments of the `linewise` binary.
//!
//! Flags override the matching config file settings. `--headless` swaps the
//! console for a scripted terminal and needs an event source.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::config::Config;
use crate::headless::{EventSource, HeadlessConfig, OutputFormat};

/// Interactive command shell with tab completion and wizard flows.
#[derive(Parser, Debug)]
#[command(name = "linewise", version, about, long_about = None)]
#[command(group(ArgGroup::new("source").args(["events", "script"])))]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH", env = "LINEWISE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Prompt shown before each input line (overrides the config file)
    #[arg(long, value_name = "TEXT")]
    pub prompt: Option<String>,

    /// Log filter such as "debug" or "linewise=trace" (overrides the config file)
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Run against scripted events instead of the console
    #[arg(long, requires = "source")]
    pub headless: bool,

    /// Comma-separated events, e.g. "line:hello world,assert:contains:Hello"
    #[arg(long, value_name = "EVENTS", requires = "headless")]
    pub events: Option<String>,

    /// Event script file, one or more events per line ("-" reads stdin)
    #[arg(long, value_name = "PATH", requires = "headless")]
    pub script: Option<String>,

    /// Report format for headless runs
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Write the headless report to a file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Stop checking assertions after the first failure
    #[arg(long)]
    pub fail_fast: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The `--config` path, or the platform default.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Applies flag overrides on top of a loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(prompt) = &self.prompt {
            config.shell.prompt = prompt.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }

    /// Where headless events come from. `None` in interactive mode.
    pub fn event_source(&self) -> Option<EventSource> {
        if !self.headless {
            return None;
        }
        match (&self.events, &self.script) {
            (Some(events), _) => Some(EventSource::Inline(events.clone())),
            (None, Some(script)) => Some(EventSource::Script(script.clone())),
            (None, None) => None,
        }
    }

    /// Headless settings derived from the flags and the effective config.
    pub fn headless_config(&self, config: &Config) -> HeadlessConfig {
        HeadlessConfig {
            prompt: config.shell.prompt.clone(),
            output_format: self.output,
            fail_fast: self.fail_fast,
            output_file: self.output_file.clone(),
        }
    }
}
