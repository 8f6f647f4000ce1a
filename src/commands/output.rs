//! Command output types.
//!
//! Command targets return a [`CommandOutput`]; the result handler decides how
//! it is written to the terminal. Output never ends the shell loop by itself,
//! only the handler's reaction to a [`ControlAction`] does.

/// Output from a command target.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    /// Nothing to report.
    None,

    /// Informational message.
    Info(String),

    /// Error message produced by the command itself.
    Error(String),

    /// Several lines of text.
    Lines(Vec<String>),

    /// Structured table data for display.
    Table {
        /// Column headers.
        headers: Vec<String>,
        /// Row data (each row is a vector of cell values).
        rows: Vec<Vec<String>>,
    },

    /// Shell control action.
    Control(ControlAction),

    /// Multiple outputs (for commands that produce several messages).
    Multiple(Vec<CommandOutput>),
}

/// Control actions that the result handler may act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    /// Leave the shell.
    Exit,
}

impl CommandOutput {
    /// Creates an info message.
    pub fn info(msg: impl Into<String>) -> Self {
        Self::Info(msg.into())
    }

    /// Creates an error message.
    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error(msg.into())
    }

    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Lines(lines.into_iter().map(Into::into).collect())
    }

    /// Creates a table output.
    pub fn table(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self::Table { headers, rows }
    }

    /// Creates a multiple output from a vector.
    pub fn multiple(outputs: Vec<CommandOutput>) -> Self {
        Self::Multiple(outputs)
    }

    /// Creates an exit control action.
    pub fn exit() -> Self {
        Self::Control(ControlAction::Exit)
    }

    /// Returns true if this output, or any nested output, requests an exit.
    pub fn requests_exit(&self) -> bool {
        match self {
            Self::Control(ControlAction::Exit) => true,
            Self::Multiple(outputs) => outputs.iter().any(Self::requests_exit),
            _ => false,
        }
    }

    /// Renders the output as plain text lines.
    ///
    /// Tables are column-aligned; control actions render nothing.
    pub fn render(&self) -> Vec<String> {
        match self {
            Self::None | Self::Control(_) => Vec::new(),
            Self::Info(msg) => msg.lines().map(String::from).collect(),
            Self::Error(msg) => vec![format!("Error: {msg}")],
            Self::Lines(lines) => lines.clone(),
            Self::Table { headers, rows } => render_table(headers, rows),
            Self::Multiple(outputs) => outputs.iter().flat_map(Self::render).collect(),
        }
    }
}

fn render_table(headers: &[String], rows: &[Vec<String>]) -> Vec<String> {
    let columns = headers
        .len()
        .max(rows.iter().map(Vec::len).max().unwrap_or(0));
    let mut widths = vec![0; columns];
    for row in std::iter::once(headers).chain(rows.iter().map(Vec::as_slice)) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let format_row = |row: &[String]| {
        row.iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    if !headers.is_empty() {
        lines.push(format_row(headers));
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("  "),
        );
    }
    lines.extend(rows.iter().map(|row| format_row(row)));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_output() {
        let output = CommandOutput::info("Hello, world!");
        assert!(matches!(output, CommandOutput::Info(ref s) if s == "Hello, world!"));
        assert_eq!(output.render(), vec!["Hello, world!"]);
    }

    #[test]
    fn test_error_output() {
        let output = CommandOutput::error("Something went wrong");
        assert_eq!(output.render(), vec!["Error: Something went wrong"]);
    }

    #[test]
    fn test_table_output() {
        let output = CommandOutput::table(
            vec!["Name".to_string(), "Age".to_string()],
            vec![
                vec!["Alice".to_string(), "30".to_string()],
                vec!["Bo".to_string(), "7".to_string()],
            ],
        );
        assert_eq!(
            output.render(),
            vec!["Name   Age", "-----  ---", "Alice  30", "Bo     7"]
        );
    }

    #[test]
    fn test_control_actions() {
        assert!(CommandOutput::exit().requests_exit());
        assert!(CommandOutput::exit().render().is_empty());
        assert!(CommandOutput::multiple(vec![CommandOutput::info("bye"), CommandOutput::exit()])
            .requests_exit());
        assert!(!CommandOutput::info("stay").requests_exit());
    }

    #[test]
    fn test_multiple_flattens() {
        let output = CommandOutput::multiple(vec![
            CommandOutput::info("one"),
            CommandOutput::None,
            CommandOutput::lines(["two", "three"]),
        ]);
        assert_eq!(output.render(), vec!["one", "two", "three"]);
    }
}
