//! Semantic role of a single layout block.
//!
//! Rules run in a fixed order and the first one with an opinion wins:
//!
//! 1. upstream label (`Title`, `Section-header`, `List-item`)
//! 2. body-text guard (inline math, lowercase start)
//! 3. structural numbering (`2.1 Background`, `IV. Results`)
//! 4. font size and bold, or position when no font data exists
//! 5. first-page title band
//! 6. list markers
//!
//! Anything left over is plain text.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{ElementKind, LayoutBlock};

use super::Patterns;

/// Labels that never become a first-page title.
const NON_TITLE_LABELS: &[&str] = &["Figure", "Table", "Page-header"];

/// Prefixes of list items, checked against the first three characters.
const LIST_MARKERS: &[&str] = &["• ", "- ", "* ", "1.", "a.", "i."];

/// Role assigned to a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockClass {
    Title,
    Section,
    Subsection,
    ListItem,
    Text,
}

impl BlockClass {
    /// Element kind for structural roles; `None` for plain text.
    pub fn structural_kind(&self) -> Option<ElementKind> {
        match self {
            Self::Title => Some(ElementKind::Title),
            Self::Section => Some(ElementKind::Section),
            Self::Subsection => Some(ElementKind::Subsection),
            Self::ListItem => Some(ElementKind::ListItem),
            Self::Text => None,
        }
    }
}

/// Block classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Headings are shorter than this many characters
    pub heading_max_len: usize,
    /// Font rules only apply above this normalized y
    pub upper_page_y: f32,
    /// Bold text at least this size is a title
    pub bold_title_size: f32,
    /// Bold text at least this size is a section
    pub bold_section_size: f32,
    /// Regular text at least this size is a title
    pub title_size: f32,
    /// Regular text at least this size is a section
    pub section_size: f32,
    /// Without font data: title above this y...
    pub top_title_y: f32,
    /// ...when shorter than this
    pub top_title_max_len: usize,
    /// Without font data: section above this y...
    pub top_section_y: f32,
    /// ...when shorter than this
    pub top_section_max_len: usize,
    /// First-page title band lower edge
    pub first_page_band_y: f32,
    /// First-page titles are longer than this
    pub first_page_min_len: usize,
    /// First-page titles are shorter than this
    pub first_page_max_len: usize,
    /// Non-bold first-page titles sit above this y
    pub first_page_top_y: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            heading_max_len: 80,
            upper_page_y: 0.3,
            bold_title_size: 16.0,
            bold_section_size: 13.0,
            title_size: 20.0,
            section_size: 17.0,
            top_title_y: 0.05,
            top_title_max_len: 40,
            top_section_y: 0.10,
            top_section_max_len: 30,
            first_page_band_y: 0.15,
            first_page_min_len: 20,
            first_page_max_len: 200,
            first_page_top_y: 0.1,
        }
    }
}

/// Assigns a [`BlockClass`] to text blocks.
#[derive(Debug, Clone)]
pub struct BlockClassifier {
    config: ClassifierConfig,
    patterns: Patterns,
}

impl BlockClassifier {
    /// Create a classifier with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(ClassifierConfig::default())
    }

    /// Create a classifier with custom configuration.
    pub fn with_config(config: ClassifierConfig) -> Result<Self> {
        Ok(Self {
            config,
            patterns: Patterns::new()?,
        })
    }

    /// Classify one block given its recognized text.
    pub fn classify(&self, block: &LayoutBlock, text: &str) -> BlockClass {
        let text = text.trim();
        let class = self
            .by_label(block, text)
            .or_else(|| self.body_text_guard(text))
            .or_else(|| self.by_numbering(text))
            .or_else(|| self.by_font(block, text))
            .or_else(|| self.by_first_page_position(block, text))
            .or_else(|| self.by_list_marker(text))
            .unwrap_or(BlockClass::Text);

        log::debug!("BlockClassifier: {:?} <- {:?}", class, truncate(text, 40));
        class
    }

    fn by_label(&self, block: &LayoutBlock, text: &str) -> Option<BlockClass> {
        match block.raw_label.as_deref()? {
            "Title" => Some(BlockClass::Title),
            "Section-header" if starts_lowercase(text) => Some(BlockClass::Text),
            "Section-header" => Some(BlockClass::Section),
            "List-item" => Some(BlockClass::ListItem),
            _ => None,
        }
    }

    fn body_text_guard(&self, text: &str) -> Option<BlockClass> {
        let has_math = text.contains('$') || text.contains("\\[") || text.contains("\\(");
        (has_math || starts_lowercase(text)).then_some(BlockClass::Text)
    }

    fn by_numbering(&self, text: &str) -> Option<BlockClass> {
        if !self.patterns.section_number.is_match(text)
            || text.chars().count() >= self.config.heading_max_len
        {
            return None;
        }
        if self.patterns.leading_year.is_match(text) {
            return Some(BlockClass::Text);
        }

        let numeral = text.split_whitespace().next().unwrap_or("");
        let depth = numeral.split('.').filter(|part| !part.is_empty()).count();
        if numeral.starts_with(|c: char| c.is_ascii_digit()) && depth > 1 {
            Some(BlockClass::Subsection)
        } else {
            Some(BlockClass::Section)
        }
    }

    fn by_font(&self, block: &LayoutBlock, text: &str) -> Option<BlockClass> {
        let c = &self.config;
        let len = text.chars().count();
        if len >= c.heading_max_len || block.bbox.y0 >= c.upper_page_y {
            return None;
        }

        match block.font_size() {
            Some(size) => {
                let bold = block.bold();
                if bold && size >= c.bold_title_size {
                    Some(BlockClass::Title)
                } else if bold && size >= c.bold_section_size {
                    Some(BlockClass::Section)
                } else if size >= c.title_size {
                    Some(BlockClass::Title)
                } else if size >= c.section_size {
                    Some(BlockClass::Section)
                } else {
                    None
                }
            }
            None => {
                let y0 = block.bbox.y0;
                if y0 < c.top_title_y && len < c.top_title_max_len {
                    Some(BlockClass::Title)
                } else if y0 < c.top_section_y && len < c.top_section_max_len {
                    Some(BlockClass::Section)
                } else {
                    None
                }
            }
        }
    }

    fn by_first_page_position(&self, block: &LayoutBlock, text: &str) -> Option<BlockClass> {
        let c = &self.config;
        let len = text.chars().count();
        let in_band = block.page_index == 0
            && block.bbox.y0 < c.first_page_band_y
            && len > c.first_page_min_len
            && len < c.first_page_max_len;
        let excluded = block
            .raw_label
            .as_deref()
            .is_some_and(|label| NON_TITLE_LABELS.contains(&label));
        if !in_band || excluded {
            return None;
        }

        (block.bold() || block.bbox.y0 < c.first_page_top_y).then_some(BlockClass::Title)
    }

    fn by_list_marker(&self, text: &str) -> Option<BlockClass> {
        let head: String = text.chars().take(3).collect();
        LIST_MARKERS
            .iter()
            .any(|marker| head.starts_with(marker))
            .then_some(BlockClass::ListItem)
    }
}

fn starts_lowercase(text: &str) -> bool {
    text.chars().next().is_some_and(char::is_lowercase)
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
