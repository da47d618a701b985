use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_command(args: &[&str], slides_dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_slidev-mcp"))
        .args(args)
        .env("SLIDEV_DIR", slides_dir)
        .env("SLIDEV_PROJECT_DIR", slides_dir.join("renderer"))
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute command")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn test_build_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let temp_path = temp_dir.path();

    let deck_path = temp_path.join("deck.json");
    fs::write(
        &deck_path,
        r#"{
            "name": "cli_deck",
            "title": "From the CLI",
            "theme": "seriph",
            "author": "Tester",
            "slides": [
                { "title": "Intro" },
                { "title": "Details", "content": "- one\n- two" }
            ]
        }"#,
    )
    .expect("Failed to write deck file");

    let output = run_command(&["build", "--deck", deck_path.to_str().unwrap()], temp_path);

    assert!(output.status.success(), "Command failed: {:?}", output);
    let payload = stdout_json(&output);
    assert_eq!(payload["success"], true);
    assert_eq!(payload["slideCount"], 2);

    let markdown = fs::read_to_string(temp_path.join("cli_deck.md")).expect("markdown written");
    assert!(markdown.contains("theme: seriph\n"));
    assert!(markdown.contains("author: Tester\n"));
}

#[test]
fn test_export_missing_input_exits_nonzero() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let missing = temp_dir.path().join("missing.md");

    let output = run_command(&["export", "--input", missing.to_str().unwrap()], temp_dir.path());

    assert!(!output.status.success());
    let payload = stdout_json(&output);
    assert_eq!(payload["success"], false);
    assert!(payload["message"].as_str().unwrap().contains("not found"));
}

#[test]
fn test_guidance_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = run_command(&["guidance", "startup pitch"], temp_dir.path());

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_eq!(stdout_json(&output)["presentationType"], "business");
}

#[test]
fn test_serve_answers_initialize() {
    use std::io::Write;
    use std::process::Stdio;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut child = Command::new(env!("CARGO_BIN_EXE_slidev-mcp"))
        .arg("serve")
        .env("SLIDEV_DIR", temp_dir.path())
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("Failed to spawn server");

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        writeln!(
            stdin,
            r#"{{"jsonrpc":"2.0","id":1,"method":"initialize","params":{{}}}}"#
        )
        .unwrap();
    }
    drop(child.stdin.take());

    let output = child.wait_with_output().expect("server output");
    assert!(output.status.success());

    let response: Value = serde_json::from_slice(&output.stdout).expect("one JSON response");
    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["serverInfo"]["name"], "slidev-mcp");
}
