//! Heuristic markdown reconstruction from raw extracted text.
//!
//! PDF text extraction loses all structure. [`Reconstructor`] rebuilds a
//! readable markdown document: a metadata header, then one block per
//! blank-line separated paragraph. Each paragraph is classified as a
//! heading, a plain paragraph, a list block, or a flowing multi-line
//! paragraph.
//!
//! Classification is delegated to a [`LineClassifier`], so heading and list
//! heuristics can be swapped without touching the block layout. Misses and
//! false positives are accepted; reconstruction never fails.

use serde::Deserialize;

/// Single-line paragraphs shorter than this may become headings.
const MAX_HEADING_CHARS: usize = 100;
/// Headings shorter than this are level 2, the rest level 3.
const MAX_SHORT_HEADING_CHARS: usize = 50;

const BULLET_MARKERS: [&str; 3] = ["•", "-", "*"];
const LITERAL_NUMBER_MARKERS: [&str; 2] = ["1.", "2."];

/// Decides what a line of extracted text looks like.
pub trait LineClassifier: Send + Sync {
    /// Heading level for a single-line paragraph, or `None` for body text.
    fn heading_level(&self, line: &str) -> Option<usize>;

    /// Whether a (trimmed) line opens a list item.
    fn is_list_item(&self, line: &str) -> bool;
}

/// Which numbered-list markers are recognized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberedLists {
    /// Only the literal prefixes `1.` and `2.`.
    #[default]
    Literal,
    /// Any run of ASCII digits followed by `.`.
    Enumerated,
}

/// Heading and list rules with literal `1.` / `2.` number markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralMarkers;

/// Same heading rules, but any `<digits>.` prefix counts as a list marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumeratedMarkers;

impl LineClassifier for LiteralMarkers {
    fn heading_level(&self, line: &str) -> Option<usize> {
        heading_level_by_shape(line)
    }

    fn is_list_item(&self, line: &str) -> bool {
        has_bullet(line) || LITERAL_NUMBER_MARKERS.iter().any(|m| line.starts_with(m))
    }
}

impl LineClassifier for EnumeratedMarkers {
    fn heading_level(&self, line: &str) -> Option<usize> {
        heading_level_by_shape(line)
    }

    fn is_list_item(&self, line: &str) -> bool {
        if has_bullet(line) {
            return true;
        }
        let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
        rest.len() < line.len() && rest.starts_with('.')
    }
}

/// Short lines that are all caps or end in `:` / `.` read as headings.
fn heading_level_by_shape(line: &str) -> Option<usize> {
    let len = line.chars().count();
    if len >= MAX_HEADING_CHARS {
        return None;
    }
    if !(is_all_upper(line) || line.ends_with(':') || line.ends_with('.')) {
        return None;
    }
    if len < MAX_SHORT_HEADING_CHARS {
        Some(2)
    } else {
        Some(3)
    }
}

fn has_bullet(line: &str) -> bool {
    BULLET_MARKERS.iter().any(|m| line.starts_with(m))
}

/// At least one cased character and no lower-case ones.
fn is_all_upper(s: &str) -> bool {
    let mut cased = false;
    for c in s.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Builds markdown documents using a pluggable [`LineClassifier`].
pub struct Reconstructor {
    classifier: Box<dyn LineClassifier>,
}

impl Default for Reconstructor {
    fn default() -> Self {
        Self::new(Box::new(LiteralMarkers))
    }
}

impl Reconstructor {
    pub fn new(classifier: Box<dyn LineClassifier>) -> Self {
        Self { classifier }
    }

    /// Reconstructor for a configured numbered-list style.
    pub fn for_style(style: NumberedLists) -> Self {
        match style {
            NumberedLists::Literal => Self::new(Box::new(LiteralMarkers)),
            NumberedLists::Enumerated => Self::new(Box::new(EnumeratedMarkers)),
        }
    }

    /// Render `text` as markdown under a metadata header.
    pub fn reconstruct(
        &self,
        text: &str,
        title: &str,
        page_count: usize,
        source_name: &str,
        processed_timestamp: &str,
    ) -> String {
        let mut md = format!(
            "# {}\n\n**Source**: {}\n**Pages**: {}\n**Processed**: {}\n\n---\n\n",
            title, source_name, page_count, processed_timestamp
        );

        let paragraphs = text.split("\n\n").map(str::trim).filter(|p| !p.is_empty());
        for paragraph in paragraphs {
            self.render_paragraph(&mut md, paragraph);
        }

        md
    }

    fn render_paragraph(&self, md: &mut String, paragraph: &str) {
        let lines: Vec<&str> = paragraph.split('\n').collect();

        if lines.len() == 1 {
            match self.classifier.heading_level(paragraph) {
                Some(level) => {
                    md.push_str(&"#".repeat(level));
                    md.push(' ');
                    md.push_str(paragraph);
                }
                None => md.push_str(paragraph),
            }
            md.push_str("\n\n");
            return;
        }

        if lines
            .iter()
            .any(|line| self.classifier.is_list_item(line.trim()))
        {
            for line in &lines {
                md.push_str(line);
                md.push('\n');
            }
            md.push('\n');
        } else {
            md.push_str(&lines.join(" "));
            md.push_str("\n\n");
        }
    }
}

/// Reconstruct markdown with the default (literal marker) classifier.
pub fn reconstruct(
    text: &str,
    title: &str,
    page_count: usize,
    source_name: &str,
    processed_timestamp: &str,
) -> String {
    Reconstructor::default().reconstruct(text, title, page_count, source_name, processed_timestamp)
}
