//! Report rendering for headless runs.

use std::fmt::Write as _;

use clap::ValueEnum;
use serde::Serialize;

use super::HeadlessResult;

/// Report format for headless runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Transcript, a summary line, then one line per failed assertion.
    #[default]
    Text,
    /// Single JSON document.
    Json,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    transcript: &'a [String],
    events_executed: usize,
    duration_ms: u64,
    assertions: JsonAssertions<'a>,
}

#[derive(Debug, Serialize)]
struct JsonAssertions<'a> {
    passed: usize,
    failed: usize,
    failures: &'a [String],
}

impl<'a> From<&'a HeadlessResult> for JsonReport<'a> {
    fn from(result: &'a HeadlessResult) -> Self {
        Self {
            transcript: &result.transcript,
            events_executed: result.events_executed,
            duration_ms: u64::try_from(result.duration.as_millis()).unwrap_or(u64::MAX),
            assertions: JsonAssertions {
                passed: result.assertions_passed,
                failed: result.assertions_failed,
                failures: &result.failures,
            },
        }
    }
}

impl HeadlessResult {
    /// Renders the run report.
    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => self.render_text(),
            OutputFormat::Json => serde_json::to_string_pretty(&JsonReport::from(self))
                .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize report: {e}\"}}")),
        }
    }

    fn render_text(&self) -> String {
        let mut out = String::new();
        for line in &self.transcript {
            out.push_str(line);
            out.push('\n');
        }

        let _ = write!(
            out,
            "Events: {} executed in {}ms",
            self.events_executed,
            self.duration.as_millis()
        );
        if self.assertions_passed + self.assertions_failed > 0 {
            let _ = write!(
                out,
                " | Assertions: {} passed, {} failed",
                self.assertions_passed, self.assertions_failed
            );
        }
        out.push('\n');

        for failure in &self.failures {
            let _ = writeln!(out, "FAILED {failure}");
        }
        out
    }
}
