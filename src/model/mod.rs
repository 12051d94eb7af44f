//! Document model types.
//!
//! Inputs (detections, layout blocks, recognized content) and outputs
//! (grid tables, semantic elements, pages) of the reconstruction pipeline.
//! The element model is format-agnostic; markup serialization lives in
//! [`crate::render`].

mod block;
mod document;
mod element;
mod region;
mod table;

pub use block::{BlockMetadata, BlockType, ExtractedContent, LayoutBlock};
pub use document::{Document, DocumentInfo, DocumentStats, Page, PageStats};
pub use element::{DocumentElement, ElementKind, TheoremEnv};
pub use region::{DetectedRegion, ImageSize, RegionKind};
pub use table::{GridCell, Table};
