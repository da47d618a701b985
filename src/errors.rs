// ABOUTME: Error types for the slidev-mcp application
// ABOUTME: Provides structured error handling for each stage of the build and export pipeline

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlidevError {
    #[error("Presentation not found. Searched: {}", format_searched(.searched))]
    InputNotFound { searched: Vec<PathBuf> },

    #[error("Cannot build a presentation with no slides")]
    EmptySlideList,

    #[error("Failed to install {package}: {reason}")]
    DependencyInstallFailed { package: String, reason: String },

    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error("Export reported success but no PDF was found. Searched: {}", format_searched(.searched))]
    ArtifactMissing { searched: Vec<PathBuf> },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("Command `{command}` exited with status {status}: {output}")]
    CommandFailed {
        command: String,
        status: String,
        output: String,
    },

    #[error("Timeout error: `{command}` did not finish within {seconds}s")]
    Timeout { command: String, seconds: u64 },

    #[error("Input validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

fn format_searched(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "(no candidates)".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// Implement conversion from anyhow::Error to our SlidevError
impl From<anyhow::Error> for SlidevError {
    fn from(err: anyhow::Error) -> Self {
        SlidevError::Unknown(err.to_string())
    }
}

impl From<validator::ValidationErrors> for SlidevError {
    fn from(err: validator::ValidationErrors) -> Self {
        SlidevError::Validation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SlidevError>;
