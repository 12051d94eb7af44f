//! Page pipeline: classify, assemble and refine each page, then collect the
//! pages into a [`Document`].

use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    DetectedRegion, Document, DocumentInfo, ExtractedContent, ImageSize, LayoutBlock, Page,
    PageStats, Table,
};
use crate::render::RenderOptions;
use crate::structure::{
    AssemblerConfig, BlockAssembler, ClassifierConfig, RefinerConfig, SemanticRefiner,
};
use crate::table::{GridConfig, GridReconstructor, TableRecognizer, ValidatorConfig};

/// Configuration for every stage of the pipeline.
///
/// A partial JSON file overrides only the fields it names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub grid: GridConfig,
    pub validator: ValidatorConfig,
    pub classifier: ClassifierConfig,
    pub assembler: AssemblerConfig,
    pub refiner: RefinerConfig,
    pub render: RenderOptions,
    /// Process pages in parallel
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            validator: ValidatorConfig::default(),
            classifier: ClassifierConfig::default(),
            assembler: AssemblerConfig::default(),
            refiner: RefinerConfig::default(),
            render: RenderOptions::default(),
            parallel: true,
        }
    }
}

impl PipelineConfig {
    /// Create a configuration with tuned defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Enable or disable parallel page processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Process pages one after another.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set render options.
    pub fn with_render(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    /// Reject values no heuristic can work with.
    pub fn validate(&self) -> Result<()> {
        let ratios = [
            ("grid.min_score", self.grid.min_score),
            ("grid.min_span_score", self.grid.min_span_score),
            ("grid.containment_ratio", self.grid.containment_ratio),
            ("grid.span_overlap_ratio", self.grid.span_overlap_ratio),
            ("validator.max_lowercase_ratio", self.validator.max_lowercase_ratio),
            ("assembler.uppercase_ratio", self.assembler.uppercase_ratio),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!("{name} must be within 0..1, got {value}")));
            }
        }
        if self.grid.cluster_gap_factor <= 0.0 {
            return Err(Error::Config("grid.cluster_gap_factor must be positive".to_string()));
        }
        Ok(())
    }

    /// Table recognizer built from the grid and validator settings.
    pub fn table_recognizer(&self) -> Result<TableRecognizer> {
        TableRecognizer::with_config(self.grid.clone(), self.validator.clone())
    }

    /// Grid reconstructor built from the grid settings.
    pub fn grid_reconstructor(&self) -> GridReconstructor {
        GridReconstructor::with_config(self.grid.clone())
    }
}

/// Layout blocks of one page and their recognized content, aligned by index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageInput {
    #[serde(default)]
    pub blocks: Vec<LayoutBlock>,
    #[serde(default)]
    pub contents: Vec<ExtractedContent>,
}

impl PageInput {
    /// Create a page from aligned blocks and contents.
    pub fn new(blocks: Vec<LayoutBlock>, contents: Vec<ExtractedContent>) -> Self {
        Self { blocks, contents }
    }

    /// Append one block with its content.
    pub fn push(&mut self, block: LayoutBlock, content: ExtractedContent) {
        self.blocks.push(block);
        self.contents.push(content);
    }

    /// Input counts for diagnostics.
    pub fn stats(&self, number: u32) -> PageStats {
        let mut stats = PageStats::new(number);
        stats.blocks = self.blocks.len();
        for content in &self.contents {
            if content.text().is_some() {
                stats.text_blocks += 1;
            } else if content.latex().is_some() {
                stats.latex_blocks += 1;
            } else if content.image_path().is_some() {
                stats.image_blocks += 1;
            }
        }
        stats
    }
}

/// A whole document dump: info plus pages in order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentInput {
    #[serde(default)]
    pub info: DocumentInfo,
    #[serde(default)]
    pub pages: Vec<PageInput>,
}

impl DocumentInput {
    /// Parse a document dump from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a document dump file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Table detections for one page image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInput {
    pub image: ImageSize,
    #[serde(default)]
    pub detections: Vec<DetectedRegion>,
}

impl TableInput {
    /// Reconstruct the table grids without filling content.
    pub fn reconstruct(&self, grid: &GridReconstructor) -> Vec<Table> {
        grid.reconstruct(&self.detections, self.image)
    }
}

/// Turns one page of blocks into semantic elements.
#[derive(Debug, Clone)]
pub struct PageProcessor {
    assembler: BlockAssembler,
    refiner: SemanticRefiner,
}

impl PageProcessor {
    /// Create a processor with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(&PipelineConfig::default())
    }

    /// Create a processor from a pipeline configuration.
    pub fn with_config(config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            assembler: BlockAssembler::with_config(
                config.assembler.clone(),
                config.classifier.clone(),
            )?,
            refiner: SemanticRefiner::with_config(config.refiner.clone())?,
        })
    }

    /// Process the page at zero-based `index`.
    pub fn process(&self, index: usize, input: &PageInput) -> Page {
        let number = index as u32 + 1;
        if input.blocks.len() != input.contents.len() {
            log::warn!(
                "PageProcessor: page {} has {} blocks but {} contents; extra entries ignored",
                number,
                input.blocks.len(),
                input.contents.len()
            );
        }

        // The page position is authoritative for first-page rules.
        let blocks: Vec<LayoutBlock> = input
            .blocks
            .iter()
            .map(|block| block.clone().on_page(index))
            .collect();
        let elements = self.assembler.assemble(&blocks, &input.contents);
        let assembled = elements.len();
        let elements = self.refiner.refine(elements, index);
        log::debug!(
            "PageProcessor: page {}: {} blocks -> {} assembled -> {} refined",
            number,
            input.blocks.len(),
            assembled,
            elements.len()
        );

        let mut page = Page::new(number);
        page.elements = elements;
        page.stats = input.stats(number);
        page
    }
}

/// Builds a document from page inputs.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    processor: PageProcessor,
    parallel: bool,
}

impl DocumentBuilder {
    /// Create a builder with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(&PipelineConfig::default())
    }

    /// Create a builder from a pipeline configuration.
    pub fn with_config(config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            processor: PageProcessor::with_config(config)?,
            parallel: config.parallel,
        })
    }

    /// Enable or disable parallel page processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Process all pages; output order matches input order.
    pub fn build(&self, pages: &[PageInput]) -> Vec<Page> {
        log::debug!(
            "DocumentBuilder: {} pages (parallel: {})",
            pages.len(),
            self.parallel
        );
        if self.parallel {
            pages
                .par_iter()
                .enumerate()
                .map(|(index, input)| self.processor.process(index, input))
                .collect()
        } else {
            pages
                .iter()
                .enumerate()
                .map(|(index, input)| self.processor.process(index, input))
                .collect()
        }
    }

    /// Build a document from a full dump.
    pub fn build_document(&self, input: &DocumentInput) -> Document {
        Document {
            info: input.info.clone(),
            pages: self.build(&input.pages),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::model::{BlockType, ElementKind};

    fn text_block(y0: f32, y1: f32) -> LayoutBlock {
        LayoutBlock::text(Rect::new(0.1, y0, 0.9, y1))
    }

    fn sample_page() -> PageInput {
        let mut page = PageInput::default();
        page.push(
            text_block(0.40, 0.42),
            ExtractedContent::Text("Experimental".into()),
        );
        page.push(
            text_block(0.44, 0.46),
            ExtractedContent::Text("Results".into()),
        );
        page.push(
            LayoutBlock::new(BlockType::Math, Rect::new(0.2, 0.5, 0.8, 0.55)),
            ExtractedContent::Latex("x^2 + y^2 = z^2".into()),
        );
        page.push(
            LayoutBlock::new(BlockType::Image, Rect::new(0.2, 0.6, 0.8, 0.8)),
            ExtractedContent::ImagePath("figs/p1_0.png".into()),
        );
        page
    }

    #[test]
    fn test_config_defaults() {
        let config = PipelineConfig::default();
        assert!(config.parallel);
        assert_eq!(config.grid.crop_padding, 12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_json() {
        let config =
            PipelineConfig::from_json(r#"{"parallel": false, "grid": {"min_score": 0.7}}"#)
                .unwrap();
        assert!(!config.parallel);
        assert_eq!(config.grid.min_score, 0.7);
        assert_eq!(config.grid.min_span_score, 0.1);
        assert_eq!(config.validator.max_single_column_rows, 2);
    }

    #[test]
    fn test_invalid_config() {
        let err = PipelineConfig::from_json(r#"{"grid": {"min_score": 1.5}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = PipelineConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_page_stats() {
        let stats = sample_page().stats(1);
        assert_eq!(stats.blocks, 4);
        assert_eq!(stats.text_blocks, 2);
        assert_eq!(stats.latex_blocks, 1);
        assert_eq!(stats.image_blocks, 1);
    }

    #[test]
    fn test_process_page() {
        let processor = PageProcessor::new().unwrap();
        let page = processor.process(2, &sample_page());

        assert_eq!(page.number, 3);
        assert_eq!(page.stats.page, 3);
        let kinds: Vec<_> = page.elements.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![ElementKind::Paragraph, ElementKind::Math, ElementKind::Image]
        );
        assert_eq!(page.elements[0].text_str(), "Experimental Results");
    }

    #[test]
    fn test_first_page_title_uses_page_position() {
        let mut page = PageInput::default();
        page.push(
            text_block(0.05, 0.08).with_font(12.0, true),
            ExtractedContent::Text("Continued discussion of the grid results".into()),
        );

        let processor = PageProcessor::new().unwrap();
        let later = processor.process(3, &page);
        assert_eq!(later.elements[0].kind, ElementKind::Paragraph);

        let first = processor.process(0, &page);
        assert_eq!(first.elements[0].kind, ElementKind::Title);
    }

    #[test]
    fn test_parallel_preserves_order() {
        let pages: Vec<_> = (0..8).map(|_| sample_page()).collect();
        let parallel = DocumentBuilder::new().unwrap().build(&pages);
        let sequential = DocumentBuilder::new()
            .unwrap()
            .with_parallel(false)
            .build(&pages);

        let numbers: Vec<_> = parallel.iter().map(|p| p.number).collect();
        assert_eq!(numbers, (1..=8).collect::<Vec<_>>());
        for (a, b) in parallel.iter().zip(&sequential) {
            assert_eq!(a.elements, b.elements);
        }
    }

    #[test]
    fn test_table_input_detector_labels() {
        let json = r#"{
            "image": {"width": 200, "height": 40},
            "detections": [
                {"bbox": {"x0": 0, "y0": 0, "x1": 200, "y1": 20}, "kind": "table row", "score": 0.9},
                {"bbox": {"x0": 0, "y0": 0, "x1": 100, "y1": 20}, "kind": "table column", "score": 0.9},
                {"bbox": {"x0": 100, "y0": 0, "x1": 200, "y1": 20}, "kind": "table column", "score": 0.9}
            ]
        }"#;
        let input: TableInput = serde_json::from_str(json).unwrap();
        let tables = input.reconstruct(&PipelineConfig::default().grid_reconstructor());

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].cells.len(), 2);
    }

    #[test]
    fn test_document_input_json() {
        let json = r#"{
            "info": {"title": "Notes"},
            "pages": [{
                "blocks": [{"bbox": {"x0": 0.1, "y0": 0.4, "x1": 0.9, "y1": 0.45}}],
                "contents": [{"text": "A single paragraph."}]
            }]
        }"#;
        let input = DocumentInput::from_json(json).unwrap();
        let doc = DocumentBuilder::new().unwrap().build_document(&input);
        assert_eq!(doc.info.title.as_deref(), Some("Notes"));
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.pages[0].elements[0].text_str(), "A single paragraph.");
    }
}
