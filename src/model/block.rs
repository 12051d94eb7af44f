//! Layout blocks and their recognized content.

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Coarse block type assigned by the upstream layout source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    /// Running text, headings, list items
    #[default]
    Text,
    /// Display math
    Math,
    /// Table region
    Table,
    /// Figure or picture
    Image,
}

/// One layout block on a page, with geometry normalized to 0..1.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutBlock {
    /// Normalized bounding box
    pub bbox: Rect,

    /// Zero-based page index
    #[serde(default)]
    pub page_index: usize,

    /// Upstream label ("Title", "Section-header", "List-item", ...)
    #[serde(default)]
    pub raw_label: Option<String>,

    /// Estimated font size in points
    #[serde(default)]
    pub font_size: Option<f32>,

    /// Whether the block is set in bold
    #[serde(default)]
    pub is_bold: Option<bool>,

    /// Coarse block type
    #[serde(default)]
    pub block_type: BlockType,
}

impl LayoutBlock {
    /// Create a block of the given type.
    pub fn new(block_type: BlockType, bbox: Rect) -> Self {
        Self {
            bbox,
            block_type,
            ..Default::default()
        }
    }

    /// Create a text block.
    pub fn text(bbox: Rect) -> Self {
        Self::new(BlockType::Text, bbox)
    }

    /// Set the page index.
    pub fn on_page(mut self, page_index: usize) -> Self {
        self.page_index = page_index;
        self
    }

    /// Set the upstream label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.raw_label = Some(label.into());
        self
    }

    /// Set font metrics.
    pub fn with_font(mut self, size: f32, bold: bool) -> Self {
        self.font_size = Some(size);
        self.is_bold = Some(bold);
        self
    }

    /// Font size when known and positive.
    pub fn font_size(&self) -> Option<f32> {
        self.font_size.filter(|s| *s > 0.0)
    }

    /// Bold flag, false when unknown.
    pub fn bold(&self) -> bool {
        self.is_bold.unwrap_or(false)
    }

    /// Metadata carried onto structural elements.
    pub fn metadata(&self) -> BlockMetadata {
        BlockMetadata {
            raw_label: self.raw_label.clone(),
            font_size: self.font_size,
            is_bold: self.is_bold,
        }
    }
}

/// Layout metadata copied from the block that produced an element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BlockMetadata {
    /// Upstream label
    pub raw_label: Option<String>,
    /// Estimated font size
    pub font_size: Option<f32>,
    /// Bold flag
    pub is_bold: Option<bool>,
}

/// Recognized payload of one block, aligned by position with its `LayoutBlock`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractedContent {
    /// OCR text (may contain `<b>`, `<i>`, `<math>` markup)
    Text(String),
    /// Typesetting markup for math or tables
    Latex(String),
    /// Path of a cropped figure
    ImagePath(PathBuf),
}

impl ExtractedContent {
    /// Text payload, if present and not blank.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(t) if !t.trim().is_empty() => Some(t),
            _ => None,
        }
    }

    /// Markup payload, if present and not blank.
    pub fn latex(&self) -> Option<&str> {
        match self {
            Self::Latex(l) if !l.trim().is_empty() => Some(l),
            _ => None,
        }
    }

    /// Image path, if present.
    pub fn image_path(&self) -> Option<&PathBuf> {
        match self {
            Self::ImagePath(p) if !p.as_os_str().is_empty() => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_accessors_skip_blank() {
        assert_eq!(ExtractedContent::Text("  ".into()).text(), None);
        assert_eq!(ExtractedContent::Text("Hi".into()).text(), Some("Hi"));
        assert_eq!(ExtractedContent::Text("Hi".into()).latex(), None);
        assert!(ExtractedContent::ImagePath(PathBuf::new())
            .image_path()
            .is_none());
    }

    #[test]
    fn test_content_json_shape() {
        let content: ExtractedContent = serde_json::from_str(r#"{"latex": "x^2"}"#).unwrap();
        assert_eq!(content, ExtractedContent::Latex("x^2".into()));

        let content: ExtractedContent =
            serde_json::from_str(r#"{"image_path": "figs/p1_0.png"}"#).unwrap();
        assert!(content.image_path().is_some());
    }

    #[test]
    fn test_block_defaults_from_json() {
        let block: LayoutBlock =
            serde_json::from_str(r#"{"bbox": {"x0": 0.1, "y0": 0.2, "x1": 0.9, "y1": 0.25}}"#)
                .unwrap();
        assert_eq!(block.block_type, BlockType::Text);
        assert!(block.raw_label.is_none());
        assert!(!block.bold());
        assert!(block.font_size().is_none());
    }

    #[test]
    fn test_zero_font_size_is_absent() {
        let block = LayoutBlock::text(Rect::default()).with_font(0.0, true);
        assert!(block.font_size().is_none());
        assert!(block.bold());
    }
}
