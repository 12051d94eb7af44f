//! Raw table-structure detections.

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};

/// Kind of table primitive reported by the structure detector.
///
/// Deserializes from either the snake_case name (`spanning_cell`) or the
/// detector's own label (`table spanning cell`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum RegionKind {
    /// Whole-table boundary
    Table,
    /// One table row
    Row,
    /// A row the detector flags as a header row
    RowHeader,
    /// One table column
    Column,
    /// A merged cell covering several rows and/or columns
    SpanningCell,
}

impl RegionKind {
    /// Map a detector label ("table row", "table spanning cell", ...) to a kind.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_ascii_lowercase().replace('_', " ");
        match label.strip_prefix("table ").unwrap_or(&label) {
            "table" => Some(Self::Table),
            "row" => Some(Self::Row),
            "row header" => Some(Self::RowHeader),
            "column" => Some(Self::Column),
            "spanning cell" => Some(Self::SpanningCell),
            _ => None,
        }
    }
}

impl TryFrom<String> for RegionKind {
    type Error = String;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        Self::from_label(&label).ok_or_else(|| format!("unknown region kind: {label}"))
    }
}

/// One detection on a page image, in pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedRegion {
    /// Bounding box in pixels
    pub bbox: Rect,
    /// What the box represents
    pub kind: RegionKind,
    /// Detector confidence in [0, 1]
    pub score: f32,
}

impl DetectedRegion {
    /// Create a new detection.
    pub fn new(kind: RegionKind, bbox: Rect, score: f32) -> Self {
        Self { bbox, kind, score }
    }
}

/// Pixel dimensions of the page image the detections refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl ImageSize {
    /// Create a new image size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The whole image as a rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }
}
