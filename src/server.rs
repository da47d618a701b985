// ABOUTME: Stdio tool server for the slidev-mcp application
// ABOUTME: Speaks line-delimited JSON-RPC 2.0 and dispatches tool calls to the registry

use crate::config::Config;
use crate::errors::{Result, SlidevError};
use crate::export::ExportDriver;
use crate::process::{CommandRunner, SystemRunner};
use crate::store::{PresentationStore, Session};
use crate::tools::{BuildPresentationTool, ExportPdfTool, GuidanceTool, ToolRegistry};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::io::{BufRead, Write};
use std::sync::Arc;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    /// Absent for notifications, which get no response
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    fn ok(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self {
            code: -32700,
            message: message.into(),
            data: None,
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
            data: None,
        }
    }

    pub fn method_not_found(message: impl Into<String>) -> Self {
        Self {
            code: -32601,
            message: message.into(),
            data: None,
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            code: -32603,
            message: message.into(),
            data: None,
        }
    }
}

/// JSON-RPC tool server over a line-oriented stream
pub struct McpServer {
    registry: ToolRegistry,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Server with the build, export and guidance tools sharing one session
    pub fn with_default_tools(config: Config, runner: Arc<dyn CommandRunner>) -> Self {
        let session = Arc::new(Session::new());
        let store = PresentationStore::from_config(&config);
        let driver = ExportDriver::new(config, runner);

        let mut registry = ToolRegistry::new();
        registry.register(Box::new(BuildPresentationTool::new(store, session.clone())));
        registry.register(Box::new(ExportPdfTool::new(driver, session)));
        registry.register(Box::new(GuidanceTool));

        Self::new(registry)
    }

    pub fn from_config(config: Config) -> Self {
        Self::with_default_tools(config, Arc::new(SystemRunner))
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handle one raw line; `None` when nothing should be written back
    pub fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.handle_request(request),
            Err(e) => {
                warn!("Unparseable request: {}", e);
                Some(JsonRpcResponse::err(
                    Value::Null,
                    JsonRpcError::parse_error(format!("Parse error: {}", e)),
                ))
            }
        }
    }

    pub fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!("Handling JSON-RPC request {}", request.method);

        let Some(id) = request.id else {
            debug!("Notification {} received", request.method);
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::ok(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {
                        "tools": { "listChanged": false }
                    },
                    "serverInfo": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }),
            ),
            "ping" => JsonRpcResponse::ok(id, json!({})),
            "tools/list" => match serde_json::to_value(self.registry.list_tools()) {
                Ok(tools) => JsonRpcResponse::ok(id, json!({ "tools": tools })),
                Err(e) => JsonRpcResponse::err(id, JsonRpcError::internal_error(e.to_string())),
            },
            "tools/call" => self.call_tool(id, request.params.unwrap_or(Value::Null)),
            other => {
                debug!("Method not found: {}", other);
                JsonRpcResponse::err(
                    id,
                    JsonRpcError::method_not_found(format!("Method not found: {}", other)),
                )
            }
        };

        Some(response)
    }

    fn call_tool(&self, id: Value, params: Value) -> JsonRpcResponse {
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return JsonRpcResponse::err(id, JsonRpcError::invalid_params("Missing tool name"));
        };
        let Some(tool) = self.registry.get(name) else {
            return JsonRpcResponse::err(
                id,
                JsonRpcError::invalid_params(format!("Unknown tool: {}", name)),
            );
        };

        info!("Calling tool {}", name);
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        match tool.call(arguments) {
            Ok(payload) => {
                let is_error = payload.get("success").and_then(Value::as_bool) == Some(false);
                match serde_json::to_string_pretty(&payload) {
                    Ok(text) => JsonRpcResponse::ok(
                        id,
                        json!({
                            "content": [{ "type": "text", "text": text }],
                            "isError": is_error
                        }),
                    ),
                    Err(e) => JsonRpcResponse::err(id, JsonRpcError::internal_error(e.to_string())),
                }
            }
            Err(SlidevError::Validation(message)) => {
                warn!("Rejected arguments for {}: {}", name, message);
                JsonRpcResponse::err(id, JsonRpcError::invalid_params(message))
            }
            Err(e) => {
                error!("Tool {} failed: {}", name, e);
                JsonRpcResponse::err(id, JsonRpcError::internal_error(e.to_string()))
            }
        }
    }

    /// Serve requests until the input stream closes
    pub fn serve<R, W>(&self, input: R, mut output: W) -> Result<()>
    where
        R: BufRead,
        W: Write,
    {
        info!("Tool server ready on stdio");
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(&line) {
                let text = serde_json::to_string(&response)?;
                writeln!(output, "{}", text)?;
                output.flush()?;
            }
        }
        info!("Input closed, shutting down");
        Ok(())
    }
}
