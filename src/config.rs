//! Configuration management for linewise.
//!
//! Settings live in a TOML file with a `[shell]` and a `[logging]` section.
//! Every field has a default, so a missing file or section is not an error.

use crate::error::{Result, ShellError};
use crate::shell::DEFAULT_COMMENT_MARKERS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Shell loop settings.
    #[serde(default)]
    pub shell: ShellConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Shell loop settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShellConfig {
    /// Prompt shown before each input line.
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Lines starting with one of these markers are ignored.
    #[serde(default = "default_comment_markers")]
    pub comment_markers: Vec<String>,

    /// Whether `help` lists commands under their group headings.
    #[serde(default = "default_show_groups")]
    pub show_groups: bool,
}

fn default_prompt() -> String {
    "shell:> ".to_string()
}

fn default_comment_markers() -> Vec<String> {
    DEFAULT_COMMENT_MARKERS.iter().map(|m| m.to_string()).collect()
}

fn default_show_groups() -> bool {
    true
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            comment_markers: default_comment_markers(),
            show_groups: default_show_groups(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set (e.g. "info", "linewise=debug").
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("linewise")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ShellError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            ShellError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.shell.comment_markers.iter().any(|m| m.trim().is_empty()) {
            return Err(ShellError::config(format!(
                "Configuration error in {}:\n  comment markers must not be blank",
                path.display()
            )));
        }
        Ok(())
    }
}
