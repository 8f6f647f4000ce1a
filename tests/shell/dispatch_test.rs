//! Dispatch loop tests: matching, binding, failures and signals.

use std::sync::{Arc, Mutex};

use anyhow::bail;
use linewise::commands::standard::standard_commands;
use linewise::commands::{CommandOutput, CommandRegistration, InMemoryCatalog, OptionType};
use linewise::completion::{CompletionContext, CompletionProposal, CompletionResolver, DefaultCompletionResolver};
use linewise::error::{Result, ShellError};
use linewise::flow::ComponentFlow;
use linewise::shell::{
    DefaultResultHandler, DispatchOutcome, HandlerAction, ResultHandler, ScriptedInputProvider, Shell,
    TerminalInputProvider,
};
use linewise::terminal::channel::ChannelTerminal;
use linewise::terminal::Terminal;
use pretty_assertions::assert_eq;

fn hello() -> CommandRegistration {
    CommandRegistration::builder()
        .command("hello world")
        .description("Print a greeting")
        .option(|o| o.long_names(["arg1"]).short_names(['a']).default_value("world"))
        .target(|ctx| {
            let name = ctx.arguments.get_str("arg1").unwrap_or_default();
            Ok(CommandOutput::info(format!("Hello {name}")))
        })
        .build()
        .unwrap()
}

fn sum() -> CommandRegistration {
    CommandRegistration::builder()
        .command("sum")
        .option(|o| o.long_names(["left"]).option_type(OptionType::Integer).position(0).required())
        .option(|o| o.long_names(["right"]).option_type(OptionType::Integer).position(1).required())
        .target(|ctx| {
            let total = ctx.arguments.get_i64("left").unwrap_or(0) + ctx.arguments.get_i64("right").unwrap_or(0);
            Ok(CommandOutput::info(total.to_string()))
        })
        .build()
        .unwrap()
}

fn failing() -> CommandRegistration {
    CommandRegistration::builder()
        .command("fail")
        .target(|_ctx| bail!("boom"))
        .build()
        .unwrap()
}

fn shell_with(registrations: Vec<CommandRegistration>) -> Shell {
    let mut all = standard_commands(true).unwrap();
    all.extend(registrations);
    Shell::new(Arc::new(InMemoryCatalog::with_registrations(all)))
}

/// Runs `lines` through the shell and returns the transcript.
fn run_lines(shell: &Shell, lines: &[&str]) -> Vec<String> {
    let (mut terminal, _feeder) = ChannelTerminal::new();
    let output = terminal.output();
    let mut input = ScriptedInputProvider::new(lines.iter().copied()).echo("shell:> ");
    shell.run(&mut input, &mut terminal).unwrap();
    output.lines()
}

/// Records a short description of every outcome.
#[derive(Default)]
struct RecordingHandler {
    seen: Mutex<Vec<String>>,
    stop_on_failure: bool,
}

impl RecordingHandler {
    fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl ResultHandler for RecordingHandler {
    fn handle(&self, outcome: &DispatchOutcome, terminal: &mut dyn Terminal) -> Result<HandlerAction> {
        let entry = match outcome {
            DispatchOutcome::Empty => "empty".to_string(),
            DispatchOutcome::Comment => "comment".to_string(),
            DispatchOutcome::Completed { command, .. } => format!("completed {command}"),
            DispatchOutcome::Cancelled { command } => format!("cancelled {command}"),
            DispatchOutcome::Failed(err) => format!("failed {}", err.category()),
        };
        self.seen.lock().unwrap().push(entry);

        let action = DefaultResultHandler.handle(outcome, terminal)?;
        if self.stop_on_failure && matches!(outcome, DispatchOutcome::Failed(_)) {
            return Ok(HandlerAction::Terminate);
        }
        Ok(action)
    }
}

#[test]
fn test_hello_world_with_options() {
    let shell = shell_with(vec![hello()]);
    let lines = run_lines(&shell, &["hello world", "hello world --arg1 there", "hello   world -a x"]);

    assert_eq!(
        lines,
        vec![
            "shell:> hello world",
            "Hello world",
            "shell:> hello world --arg1 there",
            "Hello there",
            "shell:> hello   world -a x",
            "Hello x",
        ]
    );
}

#[test]
fn test_command_not_found_does_not_stop_loop() {
    let shell = shell_with(vec![hello()]);
    let lines = run_lines(&shell, &["helloworld", "hello world"]);

    assert!(lines.contains(&"Command not found: helloworld".to_string()));
    assert_eq!(lines.last().unwrap(), "Hello world");
}

#[test]
fn test_binding_errors_are_reported() {
    let shell = shell_with(vec![sum()]);
    let lines = run_lines(&shell, &["sum 1", "sum one 2", "sum 1 2 3", "sum 1 2"]);

    let failures: Vec<&String> = lines
        .iter()
        .filter(|l| l.starts_with("Invalid arguments for 'sum'"))
        .collect();
    assert_eq!(failures.len(), 3);
    assert_eq!(lines.last().unwrap(), "3");
}

#[test]
fn test_invocation_failure_keeps_cause() {
    let handler = Arc::new(RecordingHandler::default());
    let shell = shell_with(vec![failing(), hello()]).with_result_handler(handler.clone());
    let lines = run_lines(&shell, &["fail", "hello world"]);

    assert!(lines.contains(&"Command 'fail' failed: boom".to_string()));
    assert_eq!(handler.seen(), vec!["failed Invocation Error", "completed hello world"]);

    let (mut terminal, _feeder) = ChannelTerminal::new();
    let outcome = shell
        .evaluate(&linewise::shell::Input::new("fail"), &mut terminal)
        .unwrap();
    match outcome {
        DispatchOutcome::Failed(err) => {
            let source = std::error::Error::source(&err).unwrap();
            assert_eq!(source.to_string(), "boom");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn test_panicking_command_is_reported() {
    let panicking = CommandRegistration::builder()
        .command("explode")
        .target(|_ctx| panic!("kaboom"))
        .build()
        .unwrap();
    let shell = shell_with(vec![panicking, hello()]);
    let lines = run_lines(&shell, &["explode", "hello world"]);

    assert!(lines.iter().any(|l| l.contains("kaboom")));
    assert_eq!(lines.last().unwrap(), "Hello world");
}

#[test]
fn test_exit_ends_loop() {
    let shell = shell_with(vec![hello()]);
    let lines = run_lines(&shell, &["exit", "hello world"]);
    assert_eq!(lines, vec!["shell:> exit"]);

    let lines = run_lines(&shell, &["quit", "hello world"]);
    assert_eq!(lines, vec!["shell:> quit"]);
}

#[test]
fn test_comments_and_blank_lines_are_skipped() {
    let handler = Arc::new(RecordingHandler::default());
    let shell = shell_with(vec![hello()]).with_result_handler(handler.clone());
    run_lines(&shell, &["", "// a comment", "# another", "hello world"]);

    assert_eq!(
        handler.seen(),
        vec!["empty", "comment", "comment", "completed hello world"]
    );
}

#[test]
fn test_handler_decides_termination() {
    let handler = Arc::new(RecordingHandler {
        stop_on_failure: true,
        ..RecordingHandler::default()
    });
    let shell = shell_with(vec![hello()]).with_result_handler(handler.clone());
    run_lines(&shell, &["nope", "hello world"]);

    assert_eq!(handler.seen(), vec!["failed Command Not Found"]);
}

#[test]
fn test_interrupt_clears_line_then_terminates() {
    let shell = shell_with(vec![hello()]);
    let (mut terminal, feeder) = ChannelTerminal::new();
    let output = terminal.output();

    feeder.text("hel").unwrap();
    feeder.interrupt().unwrap();
    feeder.line("hello world").unwrap();
    feeder.interrupt().unwrap();
    feeder.line("hello world").unwrap();

    let mut input = TerminalInputProvider::new("shell:> ");
    shell.run(&mut input, &mut terminal).unwrap();

    assert_eq!(
        output.lines(),
        vec!["shell:> hel", "shell:> hello world", "Hello world", "shell:> "]
    );
}

#[test]
fn test_end_of_input_terminates() {
    let shell = shell_with(vec![hello()]);
    let (mut terminal, feeder) = ChannelTerminal::new();
    let output = terminal.output();

    feeder.end_of_input().unwrap();
    feeder.line("hello world").unwrap();

    let mut input = TerminalInputProvider::new("shell:> ");
    shell.run(&mut input, &mut terminal).unwrap();

    assert!(!output.contains("Hello world"));
}

#[test]
fn test_cancelled_flow_returns_to_prompt() {
    let flow = ComponentFlow::builder()
        .with_string_input("answer", |s| s.name("Answer"))
        .build()
        .unwrap();
    let ask = CommandRegistration::builder()
        .command("ask")
        .target(move |ctx| {
            let context = flow.run(&mut *ctx.terminal)?;
            Ok(CommandOutput::info(format!(
                "got {}",
                context.get_text("answer").unwrap_or_default()
            )))
        })
        .build()
        .unwrap();

    let handler = Arc::new(RecordingHandler::default());
    let shell = shell_with(vec![ask, hello()]).with_result_handler(handler.clone());
    let (mut terminal, feeder) = ChannelTerminal::new();
    let output = terminal.output();

    feeder.line("ask").unwrap();
    feeder.text("half").unwrap();
    feeder.interrupt().unwrap();
    feeder.line("ask").unwrap();
    feeder.line("yes").unwrap();
    feeder.line("hello world").unwrap();
    drop(feeder);

    let mut input = TerminalInputProvider::new("shell:> ");
    shell.run(&mut input, &mut terminal).unwrap();

    assert_eq!(
        handler.seen(),
        vec!["cancelled ask", "completed ask", "completed hello world"]
    );
    assert!(output.contains("Answer yes"));
    assert!(output.contains("got yes"));
}

#[test]
fn test_end_of_input_inside_flow_ends_shell() {
    let flow = ComponentFlow::builder()
        .with_string_input("answer", |s| s)
        .build()
        .unwrap();
    let ask = CommandRegistration::builder()
        .command("ask")
        .target(move |ctx| {
            flow.run(&mut *ctx.terminal)?;
            Ok(CommandOutput::info("done"))
        })
        .build()
        .unwrap();

    let handler = Arc::new(RecordingHandler::default());
    let shell = shell_with(vec![ask]).with_result_handler(handler.clone());
    let (mut terminal, feeder) = ChannelTerminal::new();

    feeder.line("ask").unwrap();
    drop(feeder);

    let mut input = TerminalInputProvider::new("shell:> ");
    shell.run(&mut input, &mut terminal).unwrap();
    assert!(handler.seen().is_empty());
}

#[test]
fn test_flow_navigation_error_is_an_invocation_failure() {
    let flow = ComponentFlow::builder()
        .with_string_input("id1", |s| {
            s.result_value("x")
                .result_mode(linewise::flow::ResultMode::Accept)
                .next(|_| Some("nowhere".to_string()))
        })
        .build()
        .unwrap();
    let broken = CommandRegistration::builder()
        .command("broken")
        .target(move |ctx| {
            flow.run(&mut *ctx.terminal)?;
            Ok(CommandOutput::None)
        })
        .build()
        .unwrap();

    let shell = shell_with(vec![broken, hello()]);
    let lines = run_lines(&shell, &["broken", "hello world"]);

    assert!(lines.contains(
        &"Command 'broken' failed: Flow navigation error: step 'id1' continues to unknown step 'nowhere'"
            .to_string()
    ));
    assert_eq!(lines.last().unwrap(), "Hello world");
}

#[test]
fn test_catalog_changes_apply_to_next_dispatch() {
    let catalog = Arc::new(InMemoryCatalog::with_registrations(standard_commands(true).unwrap()));
    let writer = Arc::clone(&catalog);
    catalog.register(
        CommandRegistration::builder()
            .command("install")
            .target(move |_ctx| {
                writer.register(hello());
                Ok(CommandOutput::info("installed"))
            })
            .build()
            .unwrap(),
    );

    let shell = Shell::new(catalog);
    let lines = run_lines(&shell, &["hello world", "install", "hello world"]);

    assert_eq!(
        lines,
        vec![
            "shell:> hello world",
            "Command not found: hello world",
            "shell:> install",
            "installed",
            "shell:> hello world",
            "Hello world",
        ]
    );
}

#[test]
fn test_help_lists_groups() {
    let shell = shell_with(vec![hello()]);
    let lines = run_lines(&shell, &["help"]);

    assert!(lines.contains(&"AVAILABLE COMMANDS".to_string()));
    assert!(lines.contains(&"Built-In Commands".to_string()));
    assert!(lines.contains(&"       hello world: Print a greeting".to_string()));

    let lines = run_lines(&shell, &["help hello world"]);
    assert!(lines.contains(&"NAME".to_string()));

    let lines = run_lines(&shell, &["help nope"]);
    assert!(lines.iter().any(|l| l.ends_with("Unknown command 'nope'")));
}

#[test]
fn test_completion_through_shell() {
    let shell = shell_with(vec![hello()]);
    let values = |line: &str| -> Vec<String> {
        shell
            .complete(&CompletionContext::for_line(line))
            .into_iter()
            .map(|p| p.value().to_string())
            .collect()
    };

    assert_eq!(values("hel"), vec!["hello world", "help"]);
    assert_eq!(values("hello "), vec!["world"]);
    assert_eq!(values("hello world -"), vec!["--arg1", "-a"]);
    assert!(values("nothing ").is_empty());
}

#[test]
fn test_terminated_error_from_command_ends_loop() {
    let stop = CommandRegistration::builder()
        .command("stop")
        .target(|_ctx| Err(ShellError::Terminated.into()))
        .build()
        .unwrap();
    let shell = shell_with(vec![stop, hello()]);
    let lines = run_lines(&shell, &["stop", "hello world"]);
    assert_eq!(lines, vec!["shell:> stop"]);
}

/// Proposes inline values for `--arg1`.
struct GreetingResolver;

impl CompletionResolver for GreetingResolver {
    fn resolve(&self, _registration: &CommandRegistration, _context: &CompletionContext) -> Vec<CompletionProposal> {
        ["--arg1=there", "--arg1=world"]
            .into_iter()
            .map(CompletionProposal::new)
            .collect()
    }
}

#[test]
fn test_custom_completion_resolvers() {
    let resolvers: Vec<Arc<dyn CompletionResolver>> =
        vec![Arc::new(DefaultCompletionResolver), Arc::new(GreetingResolver)];
    let shell = shell_with(vec![hello()]).with_completion_resolvers(resolvers);
    let values = |line: &str| -> Vec<String> {
        shell
            .complete(&CompletionContext::for_line(line))
            .into_iter()
            .map(|p| p.value().to_string())
            .collect()
    };

    assert_eq!(values("hello world --arg1=t"), vec!["--arg1=there"]);
    assert_eq!(values("hello world --a"), vec!["--arg1", "--arg1=there", "--arg1=world"]);
}
