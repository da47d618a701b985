// ABOUTME: Presentation storage for the slidev-mcp application
// ABOUTME: Resolves the presentations directory and persists built decks as markdown

use crate::config::Config;
use crate::deck::{self, Deck};
use crate::errors::{Result, SlidevError};
use crate::utils;
use log::info;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};

/// Request-scoped state shared by the tool surface.
///
/// Holds the name of the most recently built deck so an export call
/// without an explicit input can find it.
#[derive(Debug, Default)]
pub struct Session {
    last_built: Mutex<Option<String>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_built(&self) -> Option<String> {
        self.last_built.lock().clone()
    }

    pub fn set_last_built(&self, name: &str) {
        *self.last_built.lock() = Some(name.to_string());
    }
}

/// Outcome of persisting a deck
#[derive(Debug, Clone)]
pub struct SavedDeck {
    pub path: PathBuf,
    pub slide_count: usize,
}

/// Markdown storage rooted at a single directory
#[derive(Debug, Clone)]
pub struct PresentationStore {
    dir: PathBuf,
}

impl PresentationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Build a store at the configured or per-platform default directory
    pub fn from_config(config: &Config) -> Self {
        Self::new(Self::resolve_directory(config))
    }

    /// The override directory when set, else the application-data default
    pub fn resolve_directory(config: &Config) -> PathBuf {
        config.presentations_dir()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a deck with this name is stored at
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.md", name.trim()))
    }

    /// Write markdown as `<dir>/<name>.md`, replacing any previous file
    pub fn save(&self, name: &str, text: &str) -> Result<PathBuf> {
        deck::validate_name(name)?;
        utils::ensure_directory_exists(&self.dir)?;

        let path = self.path_for(name);
        info!("Writing presentation to {:?}", path);
        fs::write(&path, text).map_err(SlidevError::Io)?;

        Ok(utils::absolute_path(&path))
    }

    /// Validate, build and persist a deck, recording it as the session's latest
    pub fn save_deck(&self, session: &Session, deck: &Deck) -> Result<SavedDeck> {
        deck.validate()?;

        let markdown = deck::build_markdown(deck);
        let path = self.save(&deck.name, &markdown)?;
        session.set_last_built(deck.name.trim());

        Ok(SavedDeck {
            path,
            slide_count: deck.slides.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::Slide;
    use tempfile::TempDir;

    #[test]
    fn test_save_overwrites_existing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = PresentationStore::new(temp_dir.path().join("nested/slides"));

        let first = store.save("demo", "first").expect("first save");
        let second = store.save("demo", "second").expect("second save");

        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(&second).unwrap(), "second");
    }

    #[test]
    fn test_save_deck_records_last_built() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = PresentationStore::new(temp_dir.path());
        let session = Session::new();
        let deck = Deck {
            name: "weekly".to_string(),
            title: "Weekly".to_string(),
            slides: vec![Slide::default()],
            ..Deck::default()
        };

        let saved = store.save_deck(&session, &deck).expect("save deck");

        assert_eq!(saved.slide_count, 1);
        assert!(saved.path.ends_with("weekly.md"));
        assert_eq!(session.last_built().as_deref(), Some("weekly"));
    }

    #[test]
    fn test_empty_deck_writes_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = PresentationStore::new(temp_dir.path().join("slides"));
        let session = Session::new();
        let deck = Deck {
            name: "empty".to_string(),
            title: "Empty".to_string(),
            ..Deck::default()
        };

        let result = store.save_deck(&session, &deck);

        assert!(matches!(result, Err(SlidevError::EmptySlideList)));
        assert!(!store.path_for("empty").exists());
        assert!(!store.dir().exists());
        assert!(session.last_built().is_none());
    }
}
