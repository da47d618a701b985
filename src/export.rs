// ABOUTME: PDF export driver for the slidev-mcp application
// ABOUTME: Locates, stages and exports a markdown deck through ordered Slidev CLI fallbacks

use crate::config::Config;
use crate::deck;
use crate::errors::{Result, SlidevError};
use crate::process::{CommandRunner, CommandSpec};
use crate::project::{Diagnostics, RendererProject, theme_package_name};
use crate::resolver::{self, ArtifactSearch};
use crate::store::Session;
use crate::utils;
use log::{info, warn};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Renderer flags requested by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub with_clicks: bool,
    /// Slide range such as "1,3-5,8"
    pub range: Option<String>,
    pub dark: bool,
}

impl ExportOptions {
    fn flags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if self.with_clicks {
            flags.push("--with-clicks".to_string());
        }
        if let Some(range) = self.range.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            flags.push("--range".to_string());
            flags.push(range.to_string());
        }
        if self.dark {
            flags.push("--dark".to_string());
        }
        flags
    }
}

/// What to export and where. Without a path or name, the session's
/// last built deck is used.
#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    pub input_path: Option<PathBuf>,
    pub name: Option<String>,
    pub output_path: Option<PathBuf>,
    pub options: ExportOptions,
}

/// Pipeline stages, used to report where an export stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Locating,
    Preparing,
    Staging,
    Exporting,
    Verifying,
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportStage::Locating => "locating",
            ExportStage::Preparing => "preparing",
            ExportStage::Staging => "staging",
            ExportStage::Exporting => "exporting",
            ExportStage::Verifying => "verifying",
        };
        f.write_str(name)
    }
}

/// Outcome of one export call
#[derive(Debug)]
pub struct ExportResult {
    pub success: bool,
    /// Final artifact location, set only on success
    pub pdf_path: Option<PathBuf>,
    pub message: String,
    pub slide_count: usize,
    /// Stage that failed, if any
    pub failed_stage: Option<ExportStage>,
    pub diagnostics: Diagnostics,
}

/// Ways of invoking the renderer, tried in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationStrategy {
    /// `npx slidev export ...`
    Npx,
    /// `node node_modules/@slidev/cli/bin/slidev.mjs export ...`
    NodeEntry,
}

impl InvocationStrategy {
    pub const ORDER: [InvocationStrategy; 2] =
        [InvocationStrategy::Npx, InvocationStrategy::NodeEntry];

    /// Build the command for this strategy.
    ///
    /// Only the output file name is passed; the renderer mishandles paths
    /// with directories or spaces.
    pub fn command(
        self,
        project: &RendererProject,
        config: &Config,
        staged_arg: &str,
        output_name: &str,
        options: &ExportOptions,
    ) -> Result<CommandSpec> {
        let base = match self {
            InvocationStrategy::Npx => {
                CommandSpec::new("npx", project.root(), config.export_timeout()).arg("slidev")
            }
            InvocationStrategy::NodeEntry => {
                let entry = project.cli_entry(&config.cli_package);
                if !entry.is_file() {
                    return Err(SlidevError::CommandNotFound(entry.display().to_string()));
                }
                CommandSpec::new("node", project.root(), config.export_timeout())
                    .arg(entry.to_string_lossy().to_string())
            }
        };

        Ok(base
            .args(["export", staged_arg, "--output", output_name])
            .args(options.flags()))
    }
}

impl fmt::Display for InvocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationStrategy::Npx => f.write_str("npx"),
            InvocationStrategy::NodeEntry => f.write_str("node entry script"),
        }
    }
}

/// Whether an error message points at the missing browser automation package
pub fn mentions_browser_dependency(message: &str) -> bool {
    message.to_lowercase().contains("playwright")
}

type StageResult<T> = std::result::Result<T, (ExportStage, SlidevError)>;

fn at<T>(stage: ExportStage, result: Result<T>) -> StageResult<T> {
    result.map_err(|e| (stage, e))
}

/// A located and staged input, ready for the renderer
struct StagedInput {
    source: PathBuf,
    staged: PathBuf,
    slide_count: usize,
}

/// Drives a single markdown file through the renderer to a PDF
pub struct ExportDriver {
    config: Config,
    runner: Arc<dyn CommandRunner>,
    presentations_dir: PathBuf,
    working_dir: Option<PathBuf>,
}

impl ExportDriver {
    pub fn new(config: Config, runner: Arc<dyn CommandRunner>) -> Self {
        let presentations_dir = config.presentations_dir();
        Self {
            config,
            runner,
            presentations_dir,
            working_dir: None,
        }
    }

    /// Base directory for relative inputs instead of the process cwd
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn working_dir(&self) -> PathBuf {
        self.working_dir
            .clone()
            .or_else(|| env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn project(&self) -> RendererProject {
        RendererProject::new(self.config.project_dir())
    }

    /// Candidate input locations, in search order
    pub fn input_candidates(&self, session: &Session, request: &ExportRequest) -> Vec<PathBuf> {
        let cwd = self.working_dir();
        let wrapper = self.config.wrapper_root();

        let mut bases = vec![cwd.clone()];
        bases.extend(wrapper.clone());
        bases.push(cwd.join("presentations"));
        bases.extend(wrapper.map(|w| w.join("presentations")));

        let mut candidates = Vec::new();
        if let Some(path) = request.input_path.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            if path.is_absolute() {
                candidates.push(path.clone());
            } else {
                candidates.push(path.clone());
                candidates.extend(bases.iter().map(|base| base.join(path)));
                candidates.push(self.presentations_dir.join(path));
            }
        } else {
            let name = request
                .name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .or_else(|| session.last_built());
            if let Some(name) = name {
                let name = name.trim();
                let file = if name.ends_with(".md") {
                    name.to_string()
                } else {
                    format!("{}.md", name)
                };
                candidates.push(self.presentations_dir.join(&file));
                candidates.extend(bases.iter().map(|base| base.join(&file)));
            }
        }

        let mut unique = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !unique.contains(&candidate) {
                unique.push(candidate);
            }
        }
        unique
    }

    /// First existing candidate, as an absolute path
    pub fn locate_input(&self, session: &Session, request: &ExportRequest) -> Result<PathBuf> {
        let candidates = self.input_candidates(session, request);
        let found = candidates.iter().find(|candidate| candidate.is_file()).cloned();
        match found {
            Some(path) => Ok(utils::absolute_path(&path)),
            None => Err(SlidevError::InputNotFound {
                searched: candidates,
            }),
        }
    }

    /// Output path for a located input: explicit absolute, relative to the input, or `<input>.pdf`
    pub fn output_path_for(&self, input: &Path, request: &ExportRequest) -> PathBuf {
        match request.output_path.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => input.parent().unwrap_or_else(|| Path::new(".")).join(path),
            None => input.with_extension("pdf"),
        }
    }

    /// Run the whole pipeline and report the outcome; never panics or errors
    pub fn export(&self, session: &Session, request: &ExportRequest) -> ExportResult {
        let mut diagnostics = Diagnostics::new();
        let mut slide_count = 0;

        match self.run_pipeline(session, request, &mut diagnostics, &mut slide_count) {
            Ok(pdf_path) => {
                let size = fs::metadata(&pdf_path).map(|m| m.len()).unwrap_or(0);
                let message = format!(
                    "PDF exported successfully to {} ({} bytes)",
                    pdf_path.display(),
                    size
                );
                info!("{}", message);
                ExportResult {
                    success: true,
                    pdf_path: Some(pdf_path),
                    message,
                    slide_count,
                    failed_stage: None,
                    diagnostics,
                }
            }
            Err((stage, e)) => {
                warn!("Export failed while {}: {}", stage, e);
                ExportResult {
                    success: false,
                    pdf_path: None,
                    message: e.to_string(),
                    slide_count,
                    failed_stage: Some(stage),
                    diagnostics,
                }
            }
        }
    }

    fn run_pipeline(
        &self,
        session: &Session,
        request: &ExportRequest,
        diagnostics: &mut Diagnostics,
        slide_count: &mut usize,
    ) -> StageResult<PathBuf> {
        let started = SystemTime::now();

        let source = at(ExportStage::Locating, self.locate_input(session, request))?;
        let output = utils::absolute_path(&self.output_path_for(&source, request));
        info!("Exporting {:?} to {:?}", source, output);

        let project = self.project();
        self.prepare(&project, diagnostics)
            .map_err(|e| (ExportStage::Preparing, e))?;

        let staged = at(ExportStage::Staging, self.stage(&project, &source, diagnostics))?;
        *slide_count = staged.slide_count;

        let output_name = output
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "slides.pdf".to_string());
        at(
            ExportStage::Exporting,
            self.invoke(&project, &staged, &output_name, &request.options, diagnostics),
        )?;

        let search = ArtifactSearch {
            requested: output,
            project_root: project.root().to_path_buf(),
            staged: staged.staged,
            original_stem: utils::file_stem(&staged.source),
            fresh_since: Some(started),
        };
        at(ExportStage::Verifying, resolver::resolve_artifact(&search))
    }

    /// Make sure the project exists and the CLI and default theme are installed
    fn prepare(&self, project: &RendererProject, diagnostics: &mut Diagnostics) -> Result<()> {
        project.ensure_initialized()?;

        let timeout = self.config.install_timeout();
        diagnostics.record(project.ensure_package(
            self.runner.as_ref(),
            &self.config.cli_package,
            timeout,
        ));
        diagnostics.record(project.ensure_package(
            self.runner.as_ref(),
            &self.config.default_theme_package,
            timeout,
        ));
        Ok(())
    }

    /// Copy the input into the project and install its theme
    fn stage(
        &self,
        project: &RendererProject,
        source: &Path,
        diagnostics: &mut Diagnostics,
    ) -> Result<StagedInput> {
        let markdown = fs::read_to_string(source)?;

        let staged = project.slides_dir().join(format!(
            "{}-{}.md",
            utils::file_stem(source),
            utils::short_path_hash(source)
        ));
        utils::ensure_parent_directory_exists(&staged)?;
        fs::copy(source, &staged)?;
        info!("Staged {:?} as {:?}", source, staged);

        if let Some(package) = deck::frontmatter_theme(&markdown)
            .as_deref()
            .and_then(theme_package_name)
        {
            if package != self.config.default_theme_package {
                diagnostics.record(project.ensure_package(
                    self.runner.as_ref(),
                    &package,
                    self.config.install_timeout(),
                ));
            }
        }

        Ok(StagedInput {
            source: source.to_path_buf(),
            staged,
            slide_count: deck::count_slides(&markdown),
        })
    }

    /// Try each invocation strategy until one succeeds
    fn invoke(
        &self,
        project: &RendererProject,
        staged: &StagedInput,
        output_name: &str,
        options: &ExportOptions,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let staged_name = staged
            .staged
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let staged_arg = format!("slides/{}", staged_name);

        let mut last_error: Option<SlidevError> = None;
        for (attempt, strategy) in InvocationStrategy::ORDER.iter().enumerate() {
            let outcome = strategy
                .command(project, &self.config, &staged_arg, output_name, options)
                .and_then(|command| {
                    info!("Export attempt {} via {}: {}", attempt + 1, strategy, command);
                    self.runner
                        .run(&command)
                        .and_then(|output| output.into_result(&command))
                });

            match outcome {
                Ok(_) => {
                    info!("Export via {} succeeded", strategy);
                    return Ok(());
                }
                Err(e) => {
                    warn!("Export via {} failed: {}", strategy, e);
                    let browser_related = mentions_browser_dependency(&e.to_string());
                    if attempt == 0 && browser_related {
                        diagnostics.record(project.install_browser(
                            self.runner.as_ref(),
                            &self.config.browser_package,
                            self.config.install_timeout(),
                            self.config.browser_timeout(),
                        ));
                    }
                    // A browser failure stays the reported cause over later fallbacks
                    let keep_previous = last_error
                        .as_ref()
                        .is_some_and(|prev| mentions_browser_dependency(&prev.to_string()));
                    if browser_related || !keep_previous {
                        last_error = Some(e);
                    }
                }
            }
        }

        Err(SlidevError::ExportFailed(
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no export strategy available".to_string()),
        ))
    }
}
