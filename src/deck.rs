// ABOUTME: Deck model and markdown generation for the slidev-mcp application
// ABOUTME: Converts a structured slide list into a single Slidev markdown document

use crate::errors::{Result, SlidevError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const FIRST_LAYOUT: &str = "cover";
const DEFAULT_LAYOUT: &str = "default";

/// One slide of a deck, in presentation order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    /// Slidev layout name; "cover" for the first slide and "default" after that when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Raw markdown body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Code block body, rendered only together with `codeLanguage`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_language: Option<String>,
}

impl Slide {
    fn layout_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.layout
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(fallback)
    }
}

/// A presentation before it is serialized
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    /// Stable identifier; the stored file is `<name>.md`
    pub name: String,
    pub title: String,
    pub slides: Vec<Slide>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

impl Deck {
    /// Check that the deck can be written: at least one slide and a usable file name
    pub fn validate(&self) -> Result<()> {
        if self.slides.is_empty() {
            return Err(SlidevError::EmptySlideList);
        }
        validate_name(&self.name)
    }
}

/// Reject names that would escape the presentations directory
pub fn validate_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SlidevError::Validation(
            "Presentation name must not be empty".to_string(),
        ));
    }
    if trimmed.contains('/') || trimmed.contains('\\') || trimmed == "." || trimmed == ".." {
        return Err(SlidevError::Validation(format!(
            "Presentation name must be a plain file name: {:?}",
            name
        )));
    }
    Ok(())
}

/// Build the Slidev markdown for a deck.
///
/// Titles and content are written verbatim; a `---` line followed by
/// `layout:` inside slide content will be read by Slidev as a new slide.
pub fn build_markdown(deck: &Deck) -> String {
    let mut md = String::new();

    for (index, slide) in deck.slides.iter().enumerate() {
        if index > 0 {
            md.push('\n');
        }

        md.push_str("---\n");
        if index == 0 {
            md.push_str(&format!("layout: {}\n", slide.layout_or(FIRST_LAYOUT)));
            if let Some(theme) = non_empty(deck.theme.as_deref()) {
                md.push_str(&format!("theme: {}\n", theme));
            }
            md.push_str(&format!("title: \"{}\"\n", deck.title));
            if let Some(author) = non_empty(deck.author.as_deref()) {
                md.push_str(&format!("author: {}\n", author));
            }
        } else {
            md.push_str(&format!("layout: {}\n", slide.layout_or(DEFAULT_LAYOUT)));
        }
        md.push_str("---\n");

        if let Some(title) = &slide.title {
            md.push_str(&format!("\n# {}\n", title));
        }

        if let Some(content) = &slide.content {
            md.push('\n');
            md.push_str(content.trim_end_matches('\n'));
            md.push('\n');
        }

        if let (Some(code), Some(language)) = (&slide.code, &slide.code_language) {
            md.push_str(&format!(
                "\n```{}\n{}\n```\n",
                language,
                code.trim_end_matches('\n')
            ));
        }
    }

    md
}

/// Count slides in Slidev markdown by their `---` / `layout:` headers
pub fn count_slides(markdown: &str) -> usize {
    let lines: Vec<&str> = markdown.lines().collect();
    lines
        .windows(2)
        .filter(|pair| pair[0].trim_end() == "---" && pair[1].trim_start().starts_with("layout:"))
        .count()
}

/// Read the `theme:` key of the document's leading frontmatter block
pub fn frontmatter_theme(markdown: &str) -> Option<String> {
    let mut lines = markdown.trim_start_matches('\u{feff}').trim_start().lines();
    if lines.next().map(str::trim_end) != Some("---") {
        return None;
    }

    for line in lines {
        let line = line.trim();
        if line == "---" {
            break;
        }
        if let Some(value) = line.strip_prefix("theme:") {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'').trim();
            return non_empty(Some(value)).map(str::to_string);
        }
    }

    None
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
