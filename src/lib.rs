// ABOUTME: Library module for the slidev-mcp program.
// ABOUTME: Contains deck building, presentation storage, PDF export and the tool server.

// Reexport modules
pub mod config;
pub mod deck;
pub mod errors;
pub mod export;
pub mod guidance;
pub mod process;
pub mod project;
pub mod resolver;
pub mod server;
pub mod store;
pub mod tools;
pub mod utils;

// Reexport common types and functions
pub use config::Config;
pub use deck::{Deck, Slide, build_markdown, count_slides};
pub use errors::{Result, SlidevError};
pub use export::{ExportDriver, ExportOptions, ExportRequest, ExportResult, ExportStage};
pub use process::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};
pub use project::{Diagnostics, RendererProject, theme_package_name};
pub use resolver::{ArtifactSearch, resolve_artifact};
pub use server::McpServer;
pub use store::{PresentationStore, SavedDeck, Session};
pub use tools::classify_export_error;
