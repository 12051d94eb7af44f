//! # docweave
//!
//! Reconstruct structured documents from detected layout regions.
//!
//! Upstream tools detect blocks on each page image (text, math, tables,
//! figures), recognize their content, and label them. This library turns
//! that stream into a typed document: paragraphs merged across blocks,
//! headings, theorem/proof/abstract environments, lists, tables of contents
//! and tables rebuilt from row/column detections.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docweave::{load_document, render};
//!
//! fn main() -> docweave::Result<()> {
//!     // Page dump produced by the layout and OCR stages
//!     let doc = load_document("pages.json")?;
//!
//!     let options = render::RenderOptions::default();
//!     let latex = render::to_latex(&doc, &options)?;
//!     println!("{}", latex);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Tables
//!
//! ```
//! use docweave::geometry::Rect;
//! use docweave::model::{DetectedRegion, ImageSize, RegionKind};
//! use docweave::table::{CropBox, TableRecognizer};
//!
//! let detections = vec![
//!     DetectedRegion::new(RegionKind::Table, Rect::new(0.0, 0.0, 200.0, 20.0), 0.9),
//!     DetectedRegion::new(RegionKind::Row, Rect::new(0.0, 0.0, 200.0, 20.0), 0.9),
//!     DetectedRegion::new(RegionKind::Column, Rect::new(0.0, 0.0, 100.0, 20.0), 0.9),
//!     DetectedRegion::new(RegionKind::Column, Rect::new(100.0, 0.0, 200.0, 20.0), 0.9),
//! ];
//! let ocr = |crop: &CropBox| -> docweave::Result<String> { Ok(format!("Cell {}", crop.x0)) };
//! let markup = TableRecognizer::new()?.process(&detections, ImageSize::new(200, 40), &ocr);
//! assert!(markup.contains("\\begin{tabular}{|c|c|}"));
//! # Ok::<(), docweave::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Table grids**: rows, columns and merged cells folded into a
//!   partitioned grid, validated against prose false positives
//! - **Paragraph assembly**: geometric and linguistic continuation rules
//! - **Semantic refinement**: abstract, theorem, lemma, proof, explicit
//!   sections, tables of contents, split headers
//! - **Output**: LaTeX document or JSON element stream
//! - **Parallel processing**: pages processed with Rayon

pub mod error;
pub mod geometry;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod structure;
pub mod table;

// Re-export commonly used types
pub use error::{Error, Result};
pub use geometry::Rect;
pub use model::{
    BlockType, DetectedRegion, Document, DocumentElement, DocumentInfo, ElementKind,
    ExtractedContent, GridCell, ImageSize, LayoutBlock, Page, PageStats, RegionKind, Table,
    TheoremEnv,
};
pub use pipeline::{DocumentBuilder, DocumentInput, PageInput, PageProcessor, PipelineConfig};
pub use render::{JsonFormat, PageSelection, RenderOptions, RenderResult};
pub use structure::{BlockAssembler, BlockClassifier, SemanticRefiner};
pub use table::{process_table, CellRecognizer, CropBox, TableRecognizer};

use std::path::Path;

/// Load a page dump and build the document with default settings.
///
/// # Example
///
/// ```no_run
/// use docweave::load_document;
///
/// let doc = load_document("pages.json").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Document> {
    let input = DocumentInput::load(path)?;
    build_document(&input)
}

/// Build a document from an in-memory dump with default settings.
pub fn build_document(input: &DocumentInput) -> Result<Document> {
    Ok(DocumentBuilder::new()?.build_document(input))
}

/// Assemble and refine a single page with default settings.
///
/// `blocks` and `contents` are aligned by position. The page is treated as
/// the first page of its document.
pub fn assemble_page(
    blocks: &[LayoutBlock],
    contents: &[ExtractedContent],
) -> Result<Vec<DocumentElement>> {
    let input = PageInput::new(blocks.to_vec(), contents.to_vec());
    Ok(PageProcessor::new()?.process(0, &input).elements)
}

/// Convert a page dump to a LaTeX document.
///
/// # Example
///
/// ```no_run
/// use docweave::to_latex;
///
/// let latex = to_latex("pages.json").unwrap();
/// std::fs::write("output.tex", latex).unwrap();
/// ```
pub fn to_latex<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = load_document(path)?;
    render::to_latex(&doc, &RenderOptions::default())
}

/// Convert a page dump to the JSON element model.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = load_document(path)?;
    render::to_json(&doc, format)
}

/// Builder for building and rendering documents.
///
/// # Example
///
/// ```no_run
/// use docweave::Docweave;
///
/// let latex = Docweave::new()
///     .with_title_block()
///     .with_image_base("./out")
///     .sequential()
///     .load("pages.json")?
///     .to_latex()?;
/// # Ok::<(), docweave::Error>(())
/// ```
pub struct Docweave {
    config: PipelineConfig,
}

impl Docweave {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Replace the whole pipeline configuration.
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.config = self.config.sequential();
        self
    }

    /// Emit a title block from the document info.
    pub fn with_title_block(mut self) -> Self {
        self.config.render = self.config.render.with_title_block(true);
        self
    }

    /// Render only page bodies, without preamble.
    pub fn body_only(mut self) -> Self {
        self.config.render = self.config.render.without_document();
        self
    }

    /// Write image paths relative to `dir`.
    pub fn with_image_base(mut self, dir: impl Into<std::path::PathBuf>) -> Self {
        self.config.render = self.config.render.with_image_base(dir);
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.config.render = self.config.render.with_pages(pages);
        self
    }

    /// Build a document from an in-memory dump.
    pub fn build(self, input: &DocumentInput) -> Result<DocweaveResult> {
        let document = DocumentBuilder::with_config(&self.config)?.build_document(input);
        Ok(DocweaveResult {
            document,
            render_options: self.config.render,
        })
    }

    /// Load a page dump file and build the document.
    pub fn load<P: AsRef<Path>>(self, path: P) -> Result<DocweaveResult> {
        let input = DocumentInput::load(path)?;
        self.build(&input)
    }
}

impl Default for Docweave {
    fn default() -> Self {
        Self::new()
    }
}

/// A built document plus the options to render it with.
pub struct DocweaveResult {
    /// The reconstructed document
    pub document: Document,
    /// Render options to use
    render_options: RenderOptions,
}

impl DocweaveResult {
    /// Convert to LaTeX.
    pub fn to_latex(&self) -> Result<String> {
        render::to_latex(&self.document, &self.render_options)
    }

    /// Convert to LaTeX and collect statistics.
    pub fn to_latex_with_stats(&self) -> Result<RenderResult> {
        render::to_latex_with_stats(&self.document, &self.render_options)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Get plain text of all elements.
    pub fn plain_text(&self) -> String {
        self.document.plain_text()
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(y0: f32, y1: f32) -> LayoutBlock {
        LayoutBlock::text(Rect::new(0.1, y0, 0.9, y1))
    }

    fn text(s: &str) -> ExtractedContent {
        ExtractedContent::Text(s.to_string())
    }

    fn sample_input() -> DocumentInput {
        let mut page = PageInput::default();
        page.push(block(0.40, 0.42), text("Experimental"));
        page.push(block(0.44, 0.46), text("Results"));
        DocumentInput {
            info: DocumentInfo::with_title("Sample"),
            pages: vec![page.clone(), page],
        }
    }

    #[test]
    fn test_docweave_builder() {
        let builder = Docweave::new().with_title_block().sequential();
        assert!(builder.config.render.title_block);
        assert!(!builder.config.parallel);
    }

    // ==================== Convenience Function Tests ====================

    #[test]
    fn test_assemble_page() {
        let blocks = [block(0.40, 0.42), block(0.44, 0.46)];
        let elements = assemble_page(&blocks, &[text("Experimental"), text("Results")]).unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].kind, ElementKind::Paragraph);
        assert_eq!(elements[0].text_str(), "Experimental Results");
    }

    #[test]
    fn test_assemble_page_empty() {
        assert!(assemble_page(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn test_build_document() {
        let doc = build_document(&sample_input()).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.info.title.as_deref(), Some("Sample"));
        assert_eq!(doc.stats().totals().text_blocks, 4);
    }

    #[test]
    fn test_load_document_missing_file() {
        let result = load_document("/nonexistent/pages.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    // ==================== Builder Pattern Tests ====================

    #[test]
    fn test_docweave_builder_default() {
        let builder = Docweave::default();
        assert!(builder.config.parallel);
        assert!(builder.config.render.full_document);
    }

    #[test]
    fn test_docweave_body_only_keeps_pages() {
        let builder = Docweave::new()
            .with_pages(PageSelection::Pages(vec![2]))
            .body_only();
        assert!(!builder.config.render.full_document);
        assert_eq!(
            builder.config.render.page_selection,
            PageSelection::Pages(vec![2])
        );
    }

    #[test]
    fn test_docweave_with_image_base() {
        use std::path::PathBuf;
        let builder = Docweave::new().with_image_base("./out");
        assert_eq!(
            builder.config.render.image_base,
            Some(PathBuf::from("./out"))
        );
    }

    // ==================== Output Format Tests ====================

    #[test]
    fn test_result_to_latex() {
        let result = Docweave::new().build(&sample_input()).unwrap();
        let latex = result.to_latex().unwrap();
        assert!(latex.contains("\\begin{document}"));
        assert!(latex.contains("% Page 2"));
        assert!(latex.contains("Experimental Results"));
    }

    #[test]
    fn test_result_page_selection() {
        let result = Docweave::new()
            .with_pages(PageSelection::Pages(vec![2]))
            .build(&sample_input())
            .unwrap();
        let rendered = result.to_latex_with_stats().unwrap();
        assert!(!rendered.content.contains("% Page 1\n"));
        assert!(rendered.content.contains("% Page 2\n"));
        assert_eq!(rendered.stats.page_count, 1);
    }

    #[test]
    fn test_result_to_json() {
        let result = Docweave::new().build(&sample_input()).unwrap();
        let json = result.to_json(JsonFormat::Compact).unwrap();
        assert!(json.contains(r#""type":"paragraph""#));
        assert_eq!(result.plain_text(), "Experimental Results\n\nExperimental Results");
    }
}
