//! Rendering result with statistics.

use serde::{Deserialize, Serialize};

use crate::model::{DocumentElement, ElementKind};

/// Result of rendering a document, including content and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// The rendered markup
    pub content: String,

    /// Element statistics
    pub stats: RenderStats,
}

impl RenderResult {
    /// Create a new render result.
    pub fn new(content: String, stats: RenderStats) -> Self {
        Self { content, stats }
    }

    /// Get the content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Counts of elements written during rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStats {
    /// Pages rendered
    pub page_count: u32,

    /// Titles and section headings
    pub heading_count: u32,

    /// Paragraphs, including abstracts
    pub paragraph_count: u32,

    /// List items
    pub list_item_count: u32,

    /// Theorem and proof environments
    pub environment_count: u32,

    /// Display math blocks
    pub math_count: u32,

    /// Tables, including table-of-contents markup
    pub table_count: u32,

    /// Figures
    pub image_count: u32,

    /// Whitespace-separated tokens in text payloads
    pub word_count: u32,
}

impl RenderStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment page count.
    pub fn add_page(&mut self) {
        self.page_count += 1;
    }

    /// Count one element by kind, plus the words of its text.
    pub fn add_element(&mut self, element: &DocumentElement) {
        match element.kind {
            kind if kind.is_heading() => self.heading_count += 1,
            ElementKind::Paragraph | ElementKind::Abstract => self.paragraph_count += 1,
            ElementKind::ListItem => self.list_item_count += 1,
            ElementKind::Theorem | ElementKind::Proof => self.environment_count += 1,
            ElementKind::Math => self.math_count += 1,
            ElementKind::Table | ElementKind::RawMarkup => self.table_count += 1,
            ElementKind::Image => self.image_count += 1,
            _ => {}
        }
        self.word_count += element.text_str().split_whitespace().count() as u32;
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &RenderStats) {
        self.page_count += other.page_count;
        self.heading_count += other.heading_count;
        self.paragraph_count += other.paragraph_count;
        self.list_item_count += other.list_item_count;
        self.environment_count += other.environment_count;
        self.math_count += other.math_count;
        self.table_count += other.table_count;
        self.image_count += other.image_count;
        self.word_count += other.word_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_element_counts_kind_and_words() {
        let mut stats = RenderStats::new();
        stats.add_element(&DocumentElement::with_text(ElementKind::Section, "Intro"));
        stats.add_element(&DocumentElement::paragraph("Hello, world! This is a test."));
        stats.add_element(&DocumentElement::math("x^2"));

        assert_eq!(stats.heading_count, 1);
        assert_eq!(stats.paragraph_count, 1);
        assert_eq!(stats.math_count, 1);
        assert_eq!(stats.word_count, 7);
    }

    #[test]
    fn test_stats_merge() {
        let mut stats1 = RenderStats {
            paragraph_count: 5,
            table_count: 2,
            ..Default::default()
        };
        let stats2 = RenderStats {
            paragraph_count: 3,
            table_count: 1,
            image_count: 4,
            ..Default::default()
        };

        stats1.merge(&stats2);

        assert_eq!(stats1.paragraph_count, 8);
        assert_eq!(stats1.table_count, 3);
        assert_eq!(stats1.image_count, 4);
    }
}
