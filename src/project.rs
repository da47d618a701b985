// ABOUTME: Renderer project management for the slidev-mcp application
// ABOUTME: Initializes the Slidev project directory and installs CLI, theme and browser packages

use crate::errors::{Result, SlidevError};
use crate::process::{CommandRunner, CommandSpec};
use crate::utils;
use log::{info, warn};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const THEME_SCOPE: &str = "@slidev";

/// Non-fatal problems collected while preparing an export
#[derive(Debug, Default)]
pub struct Diagnostics {
    pub advisories: Vec<SlidevError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and keep a failure without aborting the pipeline
    pub fn record(&mut self, result: Result<()>) {
        if let Err(e) = result {
            warn!("Continuing despite: {}", e);
            self.advisories.push(e);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.advisories.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.advisories.iter().map(|e| e.to_string()).collect()
    }
}

/// The Slidev working project where packages are installed and exports run
#[derive(Debug, Clone)]
pub struct RendererProject {
    root: PathBuf,
}

impl RendererProject {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where input documents are staged
    pub fn slides_dir(&self) -> PathBuf {
        self.root.join("slides")
    }

    pub fn package_dir(&self, package: &str) -> PathBuf {
        package
            .split('/')
            .fold(self.root.join("node_modules"), |dir, part| dir.join(part))
    }

    /// Entry script of the installed CLI package
    pub fn cli_entry(&self, cli_package: &str) -> PathBuf {
        self.package_dir(cli_package).join("bin").join("slidev.mjs")
    }

    /// Create the project directory and a minimal package.json if absent
    pub fn ensure_initialized(&self) -> Result<()> {
        utils::ensure_directory_exists(&self.root)?;
        utils::ensure_directory_exists(&self.slides_dir())?;

        let manifest = self.root.join("package.json");
        if !manifest.exists() {
            info!("Initializing renderer project at {:?}", self.root);
            let descriptor = json!({
                "name": "slidev-export-workspace",
                "version": "0.0.0",
                "private": true,
                "type": "module"
            });
            fs::write(&manifest, serde_json::to_string_pretty(&descriptor)?)?;
        }

        Ok(())
    }

    /// Whether a package resolves from this project's node_modules
    pub fn is_installed(&self, package: &str) -> bool {
        self.package_dir(package).join("package.json").is_file()
    }

    /// Install a package unless it already resolves.
    ///
    /// Any failure is reported as `DependencyInstallFailed` so callers can
    /// record it as an advisory and carry on.
    pub fn ensure_package(
        &self,
        runner: &dyn CommandRunner,
        package: &str,
        timeout: Duration,
    ) -> Result<()> {
        if self.is_installed(package) {
            return Ok(());
        }

        info!("Installing {} into {:?}", package, self.root);
        let command = CommandSpec::new("npm", &self.root, timeout).args([
            "install",
            "--no-audit",
            "--no-fund",
            "--save",
            package,
        ]);

        runner
            .run(&command)
            .and_then(|output| output.into_result(&command))
            .map(|_| ())
            .map_err(|e| SlidevError::DependencyInstallFailed {
                package: package.to_string(),
                reason: e.to_string(),
            })
    }

    /// Install the browser automation package and download its headless browser
    pub fn install_browser(
        &self,
        runner: &dyn CommandRunner,
        browser_package: &str,
        install_timeout: Duration,
        browser_timeout: Duration,
    ) -> Result<()> {
        self.ensure_package(runner, browser_package, install_timeout)?;

        info!("Downloading headless chromium for {}", browser_package);
        let command = CommandSpec::new("npx", &self.root, browser_timeout).args([
            "playwright",
            "install",
            "chromium",
        ]);

        runner
            .run(&command)
            .and_then(|output| output.into_result(&command))
            .map(|_| ())
            .map_err(|e| SlidevError::DependencyInstallFailed {
                package: "chromium".to_string(),
                reason: e.to_string(),
            })
    }
}

/// Map a frontmatter theme to its npm package.
///
/// `seriph` -> `@slidev/theme-seriph`, `theme-foo` -> `@slidev/theme-foo`,
/// anything scoped or containing a slash is used as-is. `none` has no package.
pub fn theme_package_name(theme: &str) -> Option<String> {
    let theme = theme.trim();
    if theme.is_empty() || theme.eq_ignore_ascii_case("none") {
        return None;
    }
    if theme.starts_with('@') || theme.contains('/') {
        return Some(theme.to_string());
    }
    if theme.starts_with("theme-") {
        return Some(format!("{}/{}", THEME_SCOPE, theme));
    }
    Some(format!("{}/theme-{}", THEME_SCOPE, theme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::CommandOutput;
    use parking_lot::Mutex;
    use tempfile::TempDir;

    struct RecordingRunner {
        calls: Mutex<Vec<CommandSpec>>,
        status: i32,
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
            self.calls.lock().push(command.clone());
            Ok(CommandOutput {
                status: Some(self.status),
                stdout: String::new(),
                stderr: "npm ERR! 404".to_string(),
            })
        }
    }

    #[test]
    fn test_theme_package_name() {
        assert_eq!(theme_package_name("seriph").as_deref(), Some("@slidev/theme-seriph"));
        assert_eq!(
            theme_package_name("theme-apple-basic").as_deref(),
            Some("@slidev/theme-apple-basic")
        );
        assert_eq!(
            theme_package_name("@company/slidev-theme-x").as_deref(),
            Some("@company/slidev-theme-x")
        );
        assert_eq!(
            theme_package_name("slidev-theme-local/dist").as_deref(),
            Some("slidev-theme-local/dist")
        );
        assert_eq!(theme_package_name("none"), None);
    }

    #[test]
    fn test_ensure_initialized_writes_manifest_once() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let project = RendererProject::new(temp_dir.path().join("renderer"));

        project.ensure_initialized().expect("init");
        let manifest = project.root().join("package.json");
        fs::write(&manifest, "{\"name\":\"custom\"}").unwrap();
        project.ensure_initialized().expect("re-init");

        assert_eq!(fs::read_to_string(&manifest).unwrap(), "{\"name\":\"custom\"}");
        assert!(project.slides_dir().is_dir());
    }

    #[test]
    fn test_installed_package_is_skipped() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let project = RendererProject::new(temp_dir.path());
        let pkg_dir = project.package_dir("@slidev/cli");
        fs::create_dir_all(&pkg_dir).unwrap();
        fs::write(pkg_dir.join("package.json"), "{}").unwrap();

        let runner = RecordingRunner {
            calls: Mutex::new(Vec::new()),
            status: 0,
        };
        project
            .ensure_package(&runner, "@slidev/cli", Duration::from_secs(1))
            .expect("already installed");

        assert!(runner.calls.lock().is_empty());
    }

    #[test]
    fn test_failed_install_is_dependency_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let project = RendererProject::new(temp_dir.path());
        let runner = RecordingRunner {
            calls: Mutex::new(Vec::new()),
            status: 1,
        };

        let result = project.ensure_package(&runner, "@slidev/theme-nope", Duration::from_secs(1));

        match result {
            Err(SlidevError::DependencyInstallFailed { package, reason }) => {
                assert_eq!(package, "@slidev/theme-nope");
                assert!(reason.contains("404"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        let calls = runner.calls.lock();
        assert_eq!(calls[0].program, "npm");
        assert_eq!(calls[0].cwd, temp_dir.path());
        assert!(calls[0].args.contains(&"@slidev/theme-nope".to_string()));
    }
}
