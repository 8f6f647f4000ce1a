//! Component flows driven from a second thread.

use std::path::Path;
use std::thread::{self, JoinHandle};

use crossterm::event::KeyCode;
use linewise::error::{Result, ShellError};
use linewise::flow::{ComponentFlow, FlowContext, ResultMode, SelectItem};
use linewise::terminal::channel::{ChannelTerminal, TerminalFeeder, TerminalOutput};
use linewise::terminal::TerminalEvent;
use pretty_assertions::assert_eq;

/// Starts the flow on its own thread; the caller plays the user.
fn spawn_flow(flow: ComponentFlow) -> (TerminalFeeder, TerminalOutput, JoinHandle<Result<FlowContext>>) {
    let (mut terminal, feeder) = ChannelTerminal::new();
    let output = terminal.output();
    let handle = thread::spawn(move || flow.run(&mut terminal));
    (feeder, output, handle)
}

#[test]
fn test_simple_flow() {
    let flow = ComponentFlow::builder()
        .with_string_input("field1", |s| s.name("Field1").default_value("defaultField1Value"))
        .with_string_input("field2", |s| s.name("Field2"))
        .with_path_input("path1", |s| s.name("Path1"))
        .with_single_item_selector("single1", |s| {
            s.name("Single1").select_items([("key1", "value1"), ("key2", "value2")])
        })
        .with_multi_item_selector("multi1", |s| {
            s.name("Multi1")
                .select_items([("key1", "value1"), ("key2", "value2"), ("key3", "value3")])
        })
        .build()
        .unwrap();

    let (feeder, output, handle) = spawn_flow(flow);

    feeder.enter().unwrap();
    feeder.line("Field2Value").unwrap();
    feeder.line("fakedir").unwrap();
    feeder.enter().unwrap();
    feeder.send(TerminalEvent::ctrl('e')).unwrap();
    feeder.key(KeyCode::Char(' ')).unwrap();
    feeder.enter().unwrap();

    let context = handle.join().unwrap().unwrap();

    assert_eq!(context.get_text("field1"), Some("defaultField1Value"));
    assert_eq!(context.get_text("field2"), Some("Field2Value"));
    assert!(context.get_path("path1").unwrap().ends_with("fakedir"));
    assert_eq!(context.get_text("single1"), Some("value1"));
    assert_eq!(context.get_list("multi1"), Some(&["value2".to_string()][..]));
    assert!(output.contains("Field1 defaultField1Value"));
    assert_eq!(
        output.lines(),
        vec![
            "Field1 defaultField1Value",
            "Field2 Field2Value",
            "Path1 fakedir",
            "Single1 value1",
            "Multi1 value2",
        ]
    );
}

#[test]
fn test_skips_given_components() {
    let flow = ComponentFlow::builder()
        .with_string_input("id1", |s| s.result_value("value1").result_mode(ResultMode::Accept))
        .with_path_input("id2", |s| s.result_value("value2").result_mode(ResultMode::Accept))
        .with_single_item_selector("id3", |s| {
            s.select_items([("key1", "value1")])
                .result_value("value3")
                .result_mode(ResultMode::Accept)
        })
        .with_multi_item_selector("id4", |s| {
            s.select_items([("key1", "value1")])
                .result_values(["value4"])
                .result_mode(ResultMode::Accept)
        })
        .build()
        .unwrap();

    // No input is ever sent; the flow must still finish.
    let (feeder, output, handle) = spawn_flow(flow);
    let context = handle.join().unwrap().unwrap();
    drop(feeder);

    assert_eq!(context.get_text("id1"), Some("value1"));
    assert_eq!(context.get_path("id2"), Some(Path::new("value2")));
    assert_eq!(context.get_text("id3"), Some("value3"));
    assert_eq!(context.get_list("id4"), Some(&["value4".to_string()][..]));
    assert!(output.lines().is_empty());
}

#[test]
fn test_chooses_dynamically() {
    let flow = ComponentFlow::builder()
        .with_string_input("id1", |s| {
            s.name("name").next(|ctx| ctx.get_text("id1").map(String::from))
        })
        .with_string_input("id2", |s| {
            s.name("name")
                .result_value("value2")
                .result_mode(ResultMode::Accept)
                .next(|_| None)
        })
        .with_string_input("id3", |s| {
            s.name("name")
                .result_value("value3")
                .result_mode(ResultMode::Accept)
                .next(|_| None)
        })
        .build()
        .unwrap();

    let (feeder, _output, handle) = spawn_flow(flow);
    feeder.line("id3").unwrap();
    feeder.enter().unwrap();

    let context = handle.join().unwrap().unwrap();

    assert_eq!(context.get_text("id1"), Some("id3"));
    assert_eq!(context.get_text("id3"), Some("value3"));
    assert!(!context.contains("id2"));
}

#[test]
fn test_auto_shows_default() {
    let flow = ComponentFlow::builder()
        .with_single_item_selector("field1", |s| {
            s.name("Field1")
                .select_items([("key1", "value1"), ("key2", "value2")])
                .default_select("key2")
        })
        .build()
        .unwrap();

    let (feeder, _output, handle) = spawn_flow(flow);
    feeder.enter().unwrap();

    let context = handle.join().unwrap().unwrap();
    assert_eq!(context.get_text("field1"), Some("value2"));
}

#[test]
fn test_verify_mode_prompts_with_preset() {
    let flow = ComponentFlow::builder()
        .with_string_input("field1", |s| {
            s.name("Field1")
                .result_value("preset")
                .result_mode(ResultMode::Verify)
        })
        .with_single_item_selector("single1", |s| {
            s.name("Single1")
                .select_items([("key1", "value1"), ("key2", "value2")])
                .result_value("value2")
                .result_mode(ResultMode::Verify)
        })
        .build()
        .unwrap();

    let (feeder, _output, handle) = spawn_flow(flow);
    feeder.enter().unwrap();
    feeder.key(KeyCode::Up).unwrap();
    feeder.enter().unwrap();

    let context = handle.join().unwrap().unwrap();
    assert_eq!(context.get_text("field1"), Some("preset"));
    assert_eq!(context.get_text("single1"), Some("value1"));
}

#[test]
fn test_multi_select_verify_prechecks_preset() {
    let flow = ComponentFlow::builder()
        .with_multi_item_selector("multi1", |s| {
            s.name("Multi1")
                .select_items([("key1", "value1"), ("key2", "value2")])
                .result_values(["value2"])
                .result_mode(ResultMode::Verify)
        })
        .with_multi_item_selector("multi2", |s| {
            s.name("Multi2")
                .select_items([("key1", "value1"), ("key2", "value2")])
                .default_value("key1")
        })
        .build()
        .unwrap();

    let (feeder, output, handle) = spawn_flow(flow);
    feeder.enter().unwrap();
    // Unchecks the preset default, then checks the second item
    feeder.key(KeyCode::Char(' ')).unwrap();
    feeder.key(KeyCode::Down).unwrap();
    feeder.key(KeyCode::Char(' ')).unwrap();
    feeder.enter().unwrap();

    let context = handle.join().unwrap().unwrap();
    assert_eq!(context.get_list("multi1"), Some(&["value2".to_string()][..]));
    assert_eq!(context.get_list("multi2"), Some(&["value2".to_string()][..]));
    assert!(output.contains("Multi1 value2"));
}

#[test]
fn test_multi_select_with_preselected_and_disabled_items() {
    let flow = ComponentFlow::builder()
        .with_multi_item_selector("multi1", |s| {
            s.name("Multi1")
                .select_item(SelectItem::of("key1", "value1").selected(true))
                .select_item(SelectItem::of("key2", "value2").disabled())
                .select_item(SelectItem::of("key3", "value3"))
        })
        .build()
        .unwrap();

    let (feeder, _output, handle) = spawn_flow(flow);
    // Down skips the disabled item
    feeder.key(KeyCode::Down).unwrap();
    feeder.key(KeyCode::Char(' ')).unwrap();
    feeder.enter().unwrap();

    let context = handle.join().unwrap().unwrap();
    assert_eq!(
        context.get_list("multi1"),
        Some(&["value1".to_string(), "value3".to_string()][..])
    );
}

#[test]
fn test_confirmation_and_masked_input() {
    let flow = ComponentFlow::builder()
        .with_string_input("secret", |s| s.name("Secret").mask('*').pattern("^[a-z]+$"))
        .with_confirmation("sure", |s| s.name("Sure").default_value("no"))
        .build()
        .unwrap();

    let (feeder, output, handle) = spawn_flow(flow);
    feeder.line("ABC").unwrap();
    feeder.line("abc").unwrap();
    feeder.enter().unwrap();

    let context = handle.join().unwrap().unwrap();
    assert_eq!(context.get_text("secret"), Some("abc"));
    assert_eq!(context.get_bool("sure"), Some(false));
    assert!(output.contains("Secret ***"));
    assert!(!output.contains("abc"));
}

#[test]
fn test_interrupt_cancels_flow() {
    let flow = ComponentFlow::builder()
        .with_string_input("field1", |s| s)
        .with_string_input("field2", |s| s)
        .build()
        .unwrap();

    let (feeder, _output, handle) = spawn_flow(flow);
    feeder.line("first").unwrap();
    feeder.interrupt().unwrap();

    assert!(matches!(handle.join().unwrap(), Err(ShellError::Cancelled)));
}

#[test]
fn test_closed_input_terminates_flow() {
    let flow = ComponentFlow::builder()
        .with_single_item_selector("single1", |s| s.select_items([("key1", "value1")]))
        .build()
        .unwrap();

    let (feeder, _output, handle) = spawn_flow(flow);
    drop(feeder);

    assert!(matches!(handle.join().unwrap(), Err(ShellError::Terminated)));
}

#[test]
fn test_flows_can_loop_back() {
    let flow = ComponentFlow::builder()
        .with_string_input("answer", |s| {
            s.name("Answer").next(|ctx| match ctx.get_text("answer") {
                Some("again") => Some("answer".to_string()),
                _ => None,
            })
        })
        .build()
        .unwrap();

    let (feeder, output, handle) = spawn_flow(flow);
    feeder.line("again").unwrap();
    feeder.line("done").unwrap();

    let context = handle.join().unwrap().unwrap();
    assert_eq!(context.get_text("answer"), Some("done"));
    assert_eq!(output.lines(), vec!["Answer again", "Answer done"]);
}
