// ABOUTME: Utility functions for the slidev-mcp application
// ABOUTME: Provides helpers for path handling, directory creation and hashing

use crate::errors::{Result, SlidevError};
use sha2::{Digest, Sha256};
use std::env;
use std::path::{Path, PathBuf};

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(SlidevError::Io)?;
    } else if !path.is_dir() {
        return Err(SlidevError::Validation(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Ensure a file's parent directory exists
pub fn ensure_parent_directory_exists(file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory_exists(parent)?;
        }
    }
    Ok(())
}

/// Get the absolute path, canonicalized when the path exists
pub fn absolute_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = std::fs::canonicalize(path) {
        return canonical;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Short hex digest of a path's text, used to keep staged copies apart
pub fn short_path_hash(path: &Path) -> String {
    let digest = Sha256::digest(path.to_string_lossy().as_bytes());
    format!("{:x}", digest)[..8].to_string()
}

/// File stem as a String, falling back to "slides"
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "slides".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_path_hash_depends_on_path_only() {
        let a = short_path_hash(Path::new("/one/deck.md"));
        let b = short_path_hash(Path::new("/two/deck.md"));
        assert_eq!(a.len(), 8);
        assert_ne!(a, b);
        assert_eq!(a, short_path_hash(Path::new("/one/deck.md")));
    }

    #[test]
    fn test_file_stem_fallback() {
        assert_eq!(file_stem(Path::new("/x/talk.md")), "talk");
        assert_eq!(file_stem(Path::new("/")), "slides");
    }
}
