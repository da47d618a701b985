// ABOUTME: Output resolution for the slidev-mcp application
// ABOUTME: Finds the PDF the renderer actually wrote and relocates it to the requested path

use crate::errors::{Result, SlidevError};
use crate::utils;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Default output names the renderer falls back to
const RENDERER_DEFAULT_OUTPUTS: &[&str] = &["slides-export.pdf"];

// Filesystems with coarse mtimes can stamp a fresh file slightly before the export started
const MTIME_SLACK: Duration = Duration::from_secs(2);

/// Everything known about an export when looking for its artifact
#[derive(Debug, Clone)]
pub struct ArtifactSearch {
    /// Absolute path the caller asked for
    pub requested: PathBuf,
    pub project_root: PathBuf,
    /// Staged copy of the input inside the renderer project
    pub staged: PathBuf,
    /// Stem of the caller's original markdown file
    pub original_stem: String,
    /// Ignore files last modified before this instant
    pub fresh_since: Option<SystemTime>,
}

impl ArtifactSearch {
    /// Plausible artifact locations, most specific first
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut candidates = vec![self.requested.clone()];

        let staged_dir = self
            .staged
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.project_root.clone());

        if let Some(file_name) = self.requested.file_name() {
            candidates.push(self.project_root.join(file_name));
            candidates.push(staged_dir.join(file_name));
        }

        let staged_stem = utils::file_stem(&self.staged);
        let default_name = format!("{}-export.pdf", staged_stem);
        candidates.push(self.project_root.join(&default_name));
        candidates.push(staged_dir.join(&default_name));

        for name in RENDERER_DEFAULT_OUTPUTS {
            candidates.push(self.project_root.join(name));
            candidates.push(staged_dir.join(name));
        }

        candidates.push(self.project_root.join(format!("{}.pdf", self.original_stem)));
        candidates.push(self.project_root.join(format!("{}-export.pdf", self.original_stem)));

        let mut unique = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !unique.contains(&candidate) {
                unique.push(candidate);
            }
        }
        unique
    }

    /// PDFs in the project root whose names start with the original stem
    fn variant_matches(&self) -> Vec<PathBuf> {
        let pattern = format!(
            "{}/{}*.pdf",
            glob::Pattern::escape(&self.project_root.to_string_lossy()),
            glob::Pattern::escape(&self.original_stem)
        );

        match glob::glob(&pattern) {
            Ok(paths) => {
                let mut found: Vec<PathBuf> = paths.flatten().collect();
                found.sort();
                found
            }
            Err(e) => {
                warn!("Invalid artifact glob {}: {}", pattern, e);
                Vec::new()
            }
        }
    }

    fn is_fresh(&self, path: &Path) -> bool {
        let Some(since) = self.fresh_since else {
            return true;
        };
        let threshold = since.checked_sub(MTIME_SLACK).unwrap_or(since);
        fs::metadata(path)
            .and_then(|m| m.modified())
            .map(|modified| modified >= threshold)
            .unwrap_or(false)
    }

    /// First fresh, existing artifact among the candidates
    pub fn find(&self) -> Option<PathBuf> {
        self.candidates()
            .into_iter()
            .chain(self.variant_matches())
            .inspect(|candidate| debug!("Checking for artifact at {:?}", candidate))
            .find(|candidate| candidate.is_file() && self.is_fresh(candidate))
    }
}

/// Locate the artifact and make sure it ends up at the requested path.
///
/// A failed copy is logged and the found location is returned instead.
pub fn resolve_artifact(search: &ArtifactSearch) -> Result<PathBuf> {
    let found = search.find().ok_or_else(|| SlidevError::ArtifactMissing {
        searched: search.candidates(),
    })?;

    if found == search.requested {
        return Ok(found);
    }

    info!("Renderer wrote {:?}, copying to {:?}", found, search.requested);
    let copied = utils::ensure_parent_directory_exists(&search.requested)
        .and_then(|_| fs::copy(&found, &search.requested).map_err(SlidevError::Io));

    match copied {
        Ok(_) => Ok(search.requested.clone()),
        Err(e) => {
            warn!(
                "Failed to copy {:?} to {:?}: {}. Reporting original location.",
                found, search.requested, e
            );
            Ok(found)
        }
    }
}
