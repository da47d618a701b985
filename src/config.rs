// ABOUTME: Configuration module for the slidev-mcp application
// ABOUTME: Provides configuration settings and environment variable handling

use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_INSTALL_TIMEOUT_MS: u64 = 180_000;
pub const DEFAULT_EXPORT_TIMEOUT_MS: u64 = 300_000;
pub const DEFAULT_BROWSER_TIMEOUT_MS: u64 = 600_000;

const APP_DIR: &str = "precursor";

/// Global configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    /// Override for the presentation storage directory (`SLIDEV_DIR`)
    pub presentations_dir: Option<PathBuf>,
    /// Override for the renderer project directory (`SLIDEV_PROJECT_DIR`)
    pub project_dir: Option<PathBuf>,
    /// Extra base directory searched when locating inputs (`SLIDEV_WRAPPER_ROOT`)
    pub wrapper_root: Option<PathBuf>,
    pub install_timeout_ms: u64,
    pub export_timeout_ms: u64,
    pub browser_timeout_ms: u64,
    pub cli_package: String,
    pub default_theme_package: String,
    pub browser_package: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            presentations_dir: None,
            project_dir: None,
            wrapper_root: None,
            install_timeout_ms: DEFAULT_INSTALL_TIMEOUT_MS,
            export_timeout_ms: DEFAULT_EXPORT_TIMEOUT_MS,
            browser_timeout_ms: DEFAULT_BROWSER_TIMEOUT_MS,
            cli_package: "@slidev/cli".to_string(),
            default_theme_package: "@slidev/theme-default".to_string(),
            browser_package: "playwright-chromium".to_string(),
        }
    }
}

impl Config {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let get_ms = |key: &str, default: u64| {
            get(key)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        let defaults = Self::default();
        Self {
            presentations_dir: get("SLIDEV_DIR").map(PathBuf::from),
            project_dir: get("SLIDEV_PROJECT_DIR").map(PathBuf::from),
            wrapper_root: get("SLIDEV_WRAPPER_ROOT").map(PathBuf::from),
            install_timeout_ms: get_ms("SLIDEV_INSTALL_TIMEOUT_MS", DEFAULT_INSTALL_TIMEOUT_MS),
            export_timeout_ms: get_ms("SLIDEV_EXPORT_TIMEOUT_MS", DEFAULT_EXPORT_TIMEOUT_MS),
            browser_timeout_ms: get_ms("SLIDEV_BROWSER_TIMEOUT_MS", DEFAULT_BROWSER_TIMEOUT_MS),
            ..defaults
        }
    }

    /// Directory where built presentations are stored
    pub fn presentations_dir(&self) -> PathBuf {
        self.presentations_dir
            .clone()
            .unwrap_or_else(|| app_data_dir().join("slides"))
    }

    /// Directory of the renderer project (its package.json and node_modules)
    pub fn project_dir(&self) -> PathBuf {
        self.project_dir
            .clone()
            .unwrap_or_else(|| app_data_dir().join("slidev-project"))
    }

    /// Root of the wrapper installation, defaulting to the executable's directory
    pub fn wrapper_root(&self) -> Option<PathBuf> {
        self.wrapper_root.clone().or_else(|| {
            env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
        })
    }

    pub fn install_timeout(&self) -> Duration {
        Duration::from_millis(self.install_timeout_ms)
    }

    pub fn export_timeout(&self) -> Duration {
        Duration::from_millis(self.export_timeout_ms)
    }

    pub fn browser_timeout(&self) -> Duration {
        Duration::from_millis(self.browser_timeout_ms)
    }
}

/// Per-platform application data directory for this tool
fn app_data_dir() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        return data.join(APP_DIR);
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(format!(".{}", APP_DIR));
    }
    PathBuf::from(format!(".{}", APP_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_overrides_are_read() {
        let config = Config::from_lookup(lookup_from(&[
            ("SLIDEV_DIR", "/tmp/decks"),
            ("SLIDEV_PROJECT_DIR", "/tmp/renderer"),
            ("SLIDEV_EXPORT_TIMEOUT_MS", "1500"),
        ]));

        assert_eq!(config.presentations_dir(), PathBuf::from("/tmp/decks"));
        assert_eq!(config.project_dir(), PathBuf::from("/tmp/renderer"));
        assert_eq!(config.export_timeout(), Duration::from_millis(1500));
        assert_eq!(config.install_timeout_ms, DEFAULT_INSTALL_TIMEOUT_MS);
    }

    #[test]
    fn test_empty_override_falls_back_to_default() {
        let config = Config::from_lookup(lookup_from(&[("SLIDEV_DIR", "  ")]));
        assert!(config.presentations_dir.is_none());
        assert!(config.presentations_dir().ends_with("slides"));
    }

    #[test]
    fn test_unparseable_timeout_uses_default() {
        let config = Config::from_lookup(lookup_from(&[("SLIDEV_INSTALL_TIMEOUT_MS", "soon")]));
        assert_eq!(config.install_timeout_ms, DEFAULT_INSTALL_TIMEOUT_MS);
    }
}
