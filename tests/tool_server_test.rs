use serde_json::{Value, json};
use slidev_mcp::server::JsonRpcRequest;
use slidev_mcp::{Config, McpServer};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn server_in(root: &Path) -> McpServer {
    let config = Config {
        presentations_dir: Some(root.join("slides")),
        project_dir: Some(root.join("renderer")),
        wrapper_root: Some(root.join("wrapper")),
        ..Config::default()
    };
    McpServer::from_config(config)
}

/// Call a tool and decode the JSON payload inside its text content
fn call_tool(server: &McpServer, name: &str, arguments: Value) -> (Value, bool) {
    let request: JsonRpcRequest = serde_json::from_value(json!({
        "jsonrpc": "2.0",
        "id": 7,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    }))
    .expect("valid request");

    let response = server.handle_request(request).expect("response");
    assert!(response.error.is_none(), "unexpected error: {:?}", response.error);

    let result = response.result.expect("result");
    let text = result["content"][0]["text"].as_str().expect("text content");
    let payload: Value = serde_json::from_str(text).expect("payload json");
    (payload, result["isError"].as_bool().unwrap_or(false))
}

#[test]
fn test_build_presentation_writes_markdown() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let server = server_in(temp_dir.path());

    let (payload, is_error) = call_tool(
        &server,
        "build_complete_presentation",
        json!({
            "name": "t1",
            "title": "Demo",
            "slides": [
                { "layout": "cover", "title": "Hello" },
                { "title": "World", "content": "- a\n- b" },
                { "title": "Code", "code": "fn main() {}", "codeLanguage": "rust" }
            ]
        }),
    );

    assert!(!is_error);
    assert_eq!(payload["success"], true);
    assert_eq!(payload["slideCount"], 3);

    let path = payload["filePath"].as_str().expect("filePath");
    assert!(path.ends_with("t1.md"));

    let markdown = fs::read_to_string(path).expect("markdown written");
    assert!(markdown.starts_with("---\nlayout: cover\ntitle: \"Demo\"\n---\n\n# Hello\n"));
    assert!(markdown.contains("---\nlayout: default\n---\n\n# World\n\n- a\n- b\n"));
    assert!(markdown.contains("```rust\nfn main() {}\n```"));
}

#[test]
fn test_empty_slides_fail_without_writing() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let server = server_in(temp_dir.path());

    let (payload, is_error) = call_tool(
        &server,
        "build_complete_presentation",
        json!({ "name": "empty", "title": "Nothing", "slides": [] }),
    );

    assert!(is_error);
    assert_eq!(payload["success"], false);
    assert_eq!(payload["slideCount"], 0);
    assert!(payload["filePath"].is_null());
    assert!(!temp_dir.path().join("slides").join("empty.md").exists());
}

#[test]
fn test_rebuild_overwrites_same_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let server = server_in(temp_dir.path());

    let build = |title: &str| {
        call_tool(
            &server,
            "build_complete_presentation",
            json!({ "name": "demo", "title": title, "slides": [{ "title": title }] }),
        )
        .0
    };

    let first = build("First");
    let second = build("Second");

    assert_eq!(first["filePath"], second["filePath"]);
    let markdown = fs::read_to_string(second["filePath"].as_str().unwrap()).unwrap();
    assert!(markdown.contains("# Second"));
    assert!(!markdown.contains("# First"));
}

#[test]
fn test_export_missing_input_reports_not_found() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let server = server_in(temp_dir.path());

    let (payload, is_error) = call_tool(
        &server,
        "export_to_pdf",
        json!({ "inputPath": temp_dir.path().join("missing.md") }),
    );

    assert!(is_error);
    assert_eq!(payload["success"], false);
    assert!(payload["pdfPath"].is_null());
    assert!(payload["message"].as_str().unwrap().contains("not found"));
    // Nothing was prepared for the renderer
    assert!(!temp_dir.path().join("renderer").exists());
}

#[test]
fn test_guidance_sample_call_builds() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let server = server_in(temp_dir.path());

    let (guidance, _) = call_tool(
        &server,
        "get_slidev_guidance",
        json!({ "presentationType": "academic" }),
    );
    let sample: Value =
        serde_json::from_str(guidance["buildTool"]["sampleCall"].as_str().expect("sampleCall"))
            .expect("sample json");

    let (payload, is_error) = call_tool(&server, "build_complete_presentation", sample);

    assert!(!is_error);
    assert_eq!(payload["success"], true);
}

#[test]
#[ignore] // Ignore by default as it requires Node.js and network access for @slidev/cli
fn test_export_with_real_renderer() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .is_test(true)
        .try_init();

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let server = server_in(temp_dir.path());

    let (built, _) = call_tool(
        &server,
        "build_complete_presentation",
        json!({
            "name": "real",
            "title": "Real Export",
            "slides": [{ "title": "One" }, { "title": "Two", "content": "Body" }]
        }),
    );
    assert_eq!(built["success"], true);

    let (payload, _) = call_tool(&server, "export_to_pdf", json!({}));

    assert_eq!(payload["success"], true, "{}", payload["message"]);
    let pdf = payload["pdfPath"].as_str().expect("pdfPath");
    assert!(fs::metadata(pdf).map(|m| m.len() > 0).unwrap_or(false));
}
