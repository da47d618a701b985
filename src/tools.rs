// ABOUTME: Tool definitions for the slidev-mcp application
// ABOUTME: Implements the build, export and guidance tools behind a common Tool trait

use crate::deck::{Deck, Slide};
use crate::errors::{Result, SlidevError};
use crate::export::{ExportDriver, ExportOptions, ExportRequest};
use crate::guidance;
use crate::store::{PresentationStore, Session};
use log::{info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use validator::Validate;

/// A callable operation exposed over the tool protocol
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn input_schema(&self) -> Value;
    /// Run the tool. `Err` means the arguments were rejected; operational
    /// failures come back as a payload with `success: false`.
    fn call(&self, params: Value) -> Result<Value>;
}

#[derive(Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Tools by name, listed in name order
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.input_schema(),
            })
            .collect()
    }
}

fn schema_for<T: JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or_else(|_| json!({ "type": "object" }))
}

/// Parse and validate tool arguments; a missing argument object counts as `{}`
fn parse_params<T>(params: Value) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Validate,
{
    let params = if params.is_null() { json!({}) } else { params };
    let parsed: T = serde_json::from_value(params)
        .map_err(|e| SlidevError::Validation(format!("Invalid arguments: {}", e)))?;
    parsed.validate()?;
    Ok(parsed)
}

#[derive(Debug, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BuildPresentationParams {
    /// File name for the presentation, without extension
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub title: String,
    /// Slides in order; the first is the cover
    pub slides: Vec<Slide>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPresentationOutput {
    pub message: String,
    pub slide_count: usize,
    pub file_path: Option<String>,
    pub success: bool,
}

pub struct BuildPresentationTool {
    store: PresentationStore,
    session: Arc<Session>,
}

impl BuildPresentationTool {
    pub fn new(store: PresentationStore, session: Arc<Session>) -> Self {
        Self { store, session }
    }

    /// Build and save; every outcome is a well-formed output
    pub fn build(&self, params: BuildPresentationParams) -> BuildPresentationOutput {
        let deck = Deck {
            name: params.name,
            title: params.title,
            slides: params.slides,
            theme: params.theme,
            author: params.author,
        };

        match self.store.save_deck(&self.session, &deck) {
            Ok(saved) => {
                info!("Built presentation {:?} with {} slides", deck.name, saved.slide_count);
                BuildPresentationOutput {
                    message: format!(
                        "Presentation built with {} slides and saved to {}",
                        saved.slide_count,
                        saved.path.display()
                    ),
                    slide_count: saved.slide_count,
                    file_path: Some(saved.path.to_string_lossy().to_string()),
                    success: true,
                }
            }
            Err(e) => {
                warn!("Failed to build presentation {:?}: {}", deck.name, e);
                BuildPresentationOutput {
                    message: e.to_string(),
                    slide_count: deck.slides.len(),
                    file_path: None,
                    success: false,
                }
            }
        }
    }
}

impl Tool for BuildPresentationTool {
    fn name(&self) -> &str {
        "build_complete_presentation"
    }

    fn description(&self) -> &str {
        "Build a complete Slidev presentation from a list of slides and save it as markdown."
    }

    fn input_schema(&self) -> Value {
        schema_for::<BuildPresentationParams>()
    }

    fn call(&self, params: Value) -> Result<Value> {
        let params: BuildPresentationParams = parse_params(params)?;
        Ok(serde_json::to_value(self.build(params))?)
    }
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExportPdfParams {
    /// Markdown file to export
    #[serde(default)]
    pub input_path: Option<String>,
    /// Name of a built presentation; used when inputPath is absent
    #[serde(default)]
    pub name: Option<String>,
    /// Destination PDF; defaults to the markdown path with a .pdf extension
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub with_clicks: Option<bool>,
    /// Slide range such as "1,3-5,8"
    #[serde(default)]
    #[validate(length(max = 200))]
    pub range: Option<String>,
    #[serde(default)]
    pub dark: Option<bool>,
}

impl ExportPdfParams {
    pub fn into_request(self) -> ExportRequest {
        ExportRequest {
            input_path: self.input_path.map(PathBuf::from),
            name: self.name,
            output_path: self.output_path.map(PathBuf::from),
            options: ExportOptions {
                with_clicks: self.with_clicks.unwrap_or(false),
                range: self.range,
                dark: self.dark.unwrap_or(false),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPdfOutput {
    pub message: String,
    pub pdf_path: Option<String>,
    pub slide_count: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Rewrite known recoverable failures into remediation hints
pub fn classify_export_error(message: &str) -> String {
    let lower = message.to_lowercase();
    if lower.contains("playwright") {
        return "PDF export needs playwright-chromium. Install it in the Slidev project with \
                `npm install -D playwright-chromium` and `npx playwright install chromium`, then retry."
            .to_string();
    }
    if lower.contains("command not found")
        || lower.contains("not recognized")
        || lower.contains("enoent")
    {
        return "Slidev CLI not found. Install Node.js and the CLI with \
                `npm install -g @slidev/cli`, then retry."
            .to_string();
    }
    message.to_string()
}

pub struct ExportPdfTool {
    driver: ExportDriver,
    session: Arc<Session>,
}

impl ExportPdfTool {
    pub fn new(driver: ExportDriver, session: Arc<Session>) -> Self {
        Self { driver, session }
    }

    pub fn export(&self, params: ExportPdfParams) -> ExportPdfOutput {
        let result = self.driver.export(&self.session, &params.into_request());
        let message = if result.success {
            result.message
        } else {
            classify_export_error(&result.message)
        };

        ExportPdfOutput {
            message,
            pdf_path: result.pdf_path.map(|p| p.to_string_lossy().to_string()),
            slide_count: result.slide_count,
            success: result.success,
            warnings: result.diagnostics.messages(),
        }
    }
}

impl Tool for ExportPdfTool {
    fn name(&self) -> &str {
        "export_to_pdf"
    }

    fn description(&self) -> &str {
        "Export a Slidev presentation to PDF. Defaults to the presentation built last."
    }

    fn input_schema(&self) -> Value {
        schema_for::<ExportPdfParams>()
    }

    fn call(&self, params: Value) -> Result<Value> {
        let params: ExportPdfParams = parse_params(params)?;
        Ok(serde_json::to_value(self.export(params))?)
    }
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceParams {
    /// Free text such as "academic", "investor pitch" or "code walkthrough"
    #[serde(default)]
    pub presentation_type: Option<String>,
}

pub struct GuidanceTool;

impl Tool for GuidanceTool {
    fn name(&self) -> &str {
        "get_slidev_guidance"
    }

    fn description(&self) -> &str {
        "Get layouts, themes and a sample build call for a kind of presentation. Call this first."
    }

    fn input_schema(&self) -> Value {
        schema_for::<GuidanceParams>()
    }

    fn call(&self, params: Value) -> Result<Value> {
        let params: GuidanceParams = parse_params(params)?;
        Ok(guidance::guidance(params.presentation_type.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_export_error() {
        assert!(classify_export_error("Error: playwright-chromium is not installed")
            .contains("npm install -D playwright-chromium"));
        assert!(classify_export_error("command not found: npx").contains("@slidev/cli"));
        assert!(classify_export_error("'slidev' is not recognized as an internal command")
            .contains("@slidev/cli"));
        assert_eq!(classify_export_error("disk full"), "disk full");
    }

    #[test]
    fn test_export_params_to_request() {
        let params: ExportPdfParams = parse_params(json!({
            "name": "t1",
            "withClicks": true,
            "range": "2-3"
        }))
        .expect("valid params");
        let request = params.into_request();

        assert_eq!(request.name.as_deref(), Some("t1"));
        assert!(request.input_path.is_none());
        assert!(request.options.with_clicks);
        assert!(!request.options.dark);
        assert_eq!(request.options.range.as_deref(), Some("2-3"));
    }

    #[test]
    fn test_build_params_reject_wrong_types() {
        let result: Result<BuildPresentationParams> = parse_params(json!({
            "name": "x",
            "title": "T",
            "slides": "not a list"
        }));
        assert!(matches!(result, Err(SlidevError::Validation(_))));

        let result: Result<BuildPresentationParams> = parse_params(json!({
            "name": "",
            "title": "T",
            "slides": []
        }));
        assert!(matches!(result, Err(SlidevError::Validation(_))));
    }

    #[test]
    fn test_schemas_describe_properties() {
        let schema = schema_for::<BuildPresentationParams>();
        assert!(schema["properties"]["slides"].is_object());
        assert!(schema["properties"]["name"].is_object());

        let schema = schema_for::<ExportPdfParams>();
        assert!(schema["properties"]["inputPath"].is_object());
    }
}
