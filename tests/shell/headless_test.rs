//! Headless runs of the `linewise` binary.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

fn run_headless(config_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_linewise"))
        .arg("--config")
        .arg(config_dir.join("missing.toml"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command");

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (exit_code, stdout, stderr)
}

#[test]
fn test_headless_hello_world() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_headless(
        dir.path(),
        &[
            "--headless",
            "--events",
            "line:hello world --arg1 there,assert:contains-exact:Hello there",
            "--output",
            "json",
        ],
    );

    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["events_executed"], 1);
    assert_eq!(parsed["transcript"][0], "shell:> hello world --arg1 there");
    assert_eq!(parsed["transcript"][1], "Hello there");
    assert_eq!(parsed["assertions"]["passed"], 1);
    assert_eq!(parsed["assertions"]["failed"], 0);
}

#[test]
fn test_headless_failed_assertion_exits_with_one() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_headless(
        dir.path(),
        &["--headless", "--events", "line:echo a b c,assert:contains:goodbye"],
    );

    assert_eq!(code, 1, "Should exit with code 1 on assertion failure");
    assert!(stdout.contains("shell:> echo a b c"));
    assert!(stdout.contains("Assertions: 0 passed, 1 failed"));
    assert!(stdout.contains("FAILED assert:contains:goodbye"));
}

#[test]
fn test_headless_wizard_script() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("wizard.events");
    std::fs::write(
        &script,
        "# walk the sample wizard with defaults\n\
         line:wizard\n\
         key:enter\n\
         key:enter\n\
         key:enter\n\
         key:space, key:enter\n\
         key:enter\n\
         assert:contains-exact:Name anonymous\n\
         assert:contains-exact:Color green\n\
         assert:contains:cheese\n\
         assert:not-contains:Discarded\n",
    )
    .unwrap();

    let (code, stdout, stderr) = run_headless(
        dir.path(),
        &["--headless", "--script", script.to_str().unwrap()],
    );

    assert_eq!(code, 0, "stdout: {stdout}\nstderr: {stderr}");
    assert!(stdout.contains("Events: 7 executed"));
    assert!(stdout.contains("Assertions: 4 passed, 0 failed"));
}

#[test]
fn test_headless_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let report = dir.path().join("report.json");
    let (code, stdout, _) = run_headless(
        dir.path(),
        &[
            "--headless",
            "--events",
            "line:sum 2 40,assert:matches:(?m)^42$",
            "--output",
            "json",
            "--output-file",
            report.to_str().unwrap(),
        ],
    );

    assert_eq!(code, 0);
    assert!(stdout.is_empty());
    let parsed: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(parsed["assertions"]["passed"], 1);
}

#[test]
fn test_headless_requires_events() {
    let dir = TempDir::new().unwrap();
    let (code, _, stderr) = run_headless(dir.path(), &["--headless"]);

    assert_eq!(code, 2, "clap usage errors exit with 2");
    assert!(stderr.contains("--events"));
}
