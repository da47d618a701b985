// ABOUTME: Main entry point for the slidev-mcp program.
// ABOUTME: Provides the CLI and runs the stdio tool server or one-off build/export commands.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use slidev_mcp::tools::{
    BuildPresentationParams, BuildPresentationTool, ExportPdfParams, ExportPdfTool,
};
use slidev_mcp::{Config, ExportDriver, McpServer, PresentationStore, Session, SystemRunner};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the presentation tools over stdio (the default)
    Serve,

    /// Build a presentation from a JSON deck description
    Build(BuildArgs),

    /// Export a markdown presentation to PDF
    Export(ExportArgs),

    /// Print authoring guidance for a kind of presentation
    Guidance {
        /// Free-text presentation type, e.g. "academic"
        presentation_type: Option<String>,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// Path to a JSON file with name, title, slides, theme and author
    #[arg(short, long)]
    deck: PathBuf,
}

#[derive(Args)]
struct ExportArgs {
    /// Path to the markdown file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Name of a stored presentation
    #[arg(short, long)]
    name: Option<String>,

    /// Path to the output PDF
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Export every click step as its own page
    #[arg(long)]
    with_clicks: bool,

    /// Slide range, e.g. "1,3-5,8"
    #[arg(long)]
    range: Option<String>,

    /// Export with the dark color scheme
    #[arg(long)]
    dark: bool,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = Config::from_env();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let server = McpServer::from_config(config);
            let stdin = io::stdin();
            server.serve(stdin.lock(), io::stdout())?;
            Ok(true)
        }
        Commands::Build(args) => {
            let text = fs::read_to_string(&args.deck)
                .with_context(|| format!("Failed to read deck file {:?}", args.deck))?;
            let params: BuildPresentationParams =
                serde_json::from_str(&text).context("Deck file is not a valid deck")?;

            let tool = BuildPresentationTool::new(
                PresentationStore::from_config(&config),
                Arc::new(Session::new()),
            );
            let output = tool.build(params);
            print_json(&output)?;
            Ok(output.success)
        }
        Commands::Export(args) => {
            let params = ExportPdfParams {
                input_path: args.input.map(|p| p.to_string_lossy().to_string()),
                name: args.name,
                output_path: args.output.map(|p| p.to_string_lossy().to_string()),
                with_clicks: Some(args.with_clicks),
                range: args.range,
                dark: Some(args.dark),
            };

            let tool = ExportPdfTool::new(
                ExportDriver::new(config, Arc::new(SystemRunner)),
                Arc::new(Session::new()),
            );
            let output = tool.export(params);
            print_json(&output)?;
            Ok(output.success)
        }
        Commands::Guidance { presentation_type } => {
            print_json(&slidev_mcp::guidance::guidance(presentation_type.as_deref()))?;
            Ok(true)
        }
    }
}

fn main() {
    // stdout carries protocol messages, so logs go to stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
