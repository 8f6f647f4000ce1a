//! linewise - interactive command shell with tab completion and wizard flows.

mod sample;

use std::sync::Arc;

use linewise::cli::Cli;
use linewise::commands::standard::standard_commands;
use linewise::commands::InMemoryCatalog;
use linewise::completion::CompletionContext;
use linewise::config::Config;
use linewise::error::Result;
use linewise::headless::run_headless;
use linewise::logging;
use linewise::shell::{Shell, TerminalInputProvider};
use linewise::terminal::console::ConsoleTerminal;
use tracing::{error, info};

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{}: {}", e.category(), e);
            eprintln!("{}: {}", e.category(), e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse_args();

    let config_path = cli.config_path();
    let mut config = Config::load_from_file(&config_path)?;
    cli.apply_overrides(&mut config);

    let source = cli.event_source();
    if source.is_some() {
        logging::init_stderr_logging(&config.logging.level);
    } else {
        logging::init_file_logging(&config.logging.level);
    }
    info!("Loaded config from: {}", config_path.display());

    let shell = build_shell(&config)?;

    if let Some(source) = source {
        return run_headless(&shell, cli.headless_config(&config), &source);
    }

    let mut terminal = ConsoleTerminal::open()?;
    let completer = |context: &CompletionContext| shell.complete(context);
    let mut input = TerminalInputProvider::new(config.shell.prompt.as_str()).completer(&completer);
    shell.run(&mut input, &mut terminal)?;
    Ok(0)
}

/// Registers the built-in and sample commands.
fn build_shell(config: &Config) -> Result<Shell> {
    let catalog = InMemoryCatalog::new();
    for registration in standard_commands(config.shell.show_groups)?
        .into_iter()
        .chain(sample::sample_commands()?)
    {
        catalog.register(registration);
    }

    Ok(Shell::new(Arc::new(catalog)).with_comment_markers(config.shell.comment_markers.iter().cloned()))
}
