// ABOUTME: Static authoring guidance for the slidev-mcp application
// ABOUTME: Normalizes a free-text presentation type and returns layouts, themes and tool usage

use serde_json::{Value, json};

/// Categories guidance is available for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationType {
    Academic,
    Business,
    Technical,
    General,
}

impl PresentationType {
    /// Map free text onto a known category by keyword, case-insensitively
    pub fn normalize(input: Option<&str>) -> Self {
        let text = match input {
            Some(text) => text.trim().to_lowercase(),
            None => return PresentationType::General,
        };

        const ACADEMIC: &[&str] = &[
            "academ", "research", "paper", "lecture", "thesis", "conference", "class",
        ];
        const BUSINESS: &[&str] = &[
            "business", "pitch", "sales", "startup", "investor", "marketing", "quarterly",
            "executive",
        ];
        const TECHNICAL: &[&str] = &[
            "tech", "code", "engineer", "developer", "software", "architecture", "demo",
        ];

        let matches = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));
        if matches(ACADEMIC) {
            PresentationType::Academic
        } else if matches(BUSINESS) {
            PresentationType::Business
        } else if matches(TECHNICAL) {
            PresentationType::Technical
        } else {
            PresentationType::General
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PresentationType::Academic => "academic",
            PresentationType::Business => "business",
            PresentationType::Technical => "technical",
            PresentationType::General => "general",
        }
    }

    fn recommended_theme(self) -> &'static str {
        match self {
            PresentationType::Academic => "seriph",
            PresentationType::Business => "apple-basic",
            PresentationType::Technical => "default",
            PresentationType::General => "default",
        }
    }

    fn tips(self) -> Vec<&'static str> {
        match self {
            PresentationType::Academic => vec![
                "Open with the research question, then methods, results and conclusions",
                "Keep one claim per slide and cite sources in the slide content",
                "Use 'two-cols' to put figures next to their interpretation",
            ],
            PresentationType::Business => vec![
                "Lead with the key message and the ask",
                "Prefer short bullet lists of three to five items",
                "Use 'fact' or 'statement' layouts for headline numbers",
            ],
            PresentationType::Technical => vec![
                "Pair each code slide with a short explanation in the content",
                "Set both code and codeLanguage so the block is highlighted",
                "Keep code excerpts under twenty lines per slide",
            ],
            PresentationType::General => vec![
                "Give every slide a title",
                "Keep slides focused on a single idea",
                "End with a summary or next steps slide",
            ],
        }
    }
}

/// Guidance payload for the given free-text presentation type
pub fn guidance(presentation_type: Option<&str>) -> Value {
    let kind = PresentationType::normalize(presentation_type);
    let theme = kind.recommended_theme();

    let sample_call = json!({
        "name": "quarterly_update",
        "title": "Quarterly Update",
        "author": "Your Name",
        "theme": theme,
        "slides": [
            { "title": "Quarterly Update", "content": "Highlights and next steps" },
            {
                "title": "Highlights",
                "content": "- Shipped the export pipeline\n- Cut build time in half"
            },
            {
                "layout": "two-cols",
                "title": "Example",
                "code": "console.log('hello')",
                "codeLanguage": "js"
            }
        ]
    });

    json!({
        "presentationType": kind.as_str(),
        "recommendedTheme": theme,
        "layouts": {
            "cover": "Title slide; the default for the first slide",
            "default": "Standard content slide; the default after the first slide",
            "center": "Centered content",
            "two-cols": "Two columns of content",
            "section": "Section divider",
            "quote": "A prominent quotation",
            "fact": "A single highlighted fact or number",
            "statement": "A bold single statement",
            "end": "Closing slide"
        },
        "tips": kind.tips(),
        "buildTool": {
            "name": "build_complete_presentation",
            "notes": [
                "slides must contain at least one slide",
                "code is rendered only when codeLanguage is also given",
                "the file is saved as <name>.md and overwritten on rebuild"
            ],
            "sampleCall": serde_json::to_string_pretty(&sample_call).unwrap_or_default()
        },
        "exportTool": {
            "name": "export_to_pdf",
            "notes": [
                "call with no arguments to export the presentation built last",
                "or pass name, or inputPath to a markdown file",
                "optional: outputPath, withClicks, range (e.g. \"1,3-5\"), dark"
            ]
        }
    })
}
