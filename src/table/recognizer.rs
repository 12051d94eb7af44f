//! Table recognition: grid reconstruction, cell OCR, validation, markup.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::model::{DetectedRegion, ImageSize, Table};
use crate::render::{MarkupEscaper, TabularRenderer};

use super::{GridConfig, GridReconstructor, TableValidator, ValidatorConfig};

/// Integer pixel region of the page image handed to the text recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBox {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl CropBox {
    /// Crop for a cell: the box clamped to the image, then padded and
    /// clamped again. `None` when the clamped box is degenerate.
    pub fn for_cell(bbox: &Rect, image: ImageSize, padding: u32) -> Option<Self> {
        let x0 = bbox.x0.max(0.0) as u32;
        let y0 = bbox.y0.max(0.0) as u32;
        let x1 = (bbox.x1.max(0.0) as u32).min(image.width);
        let y1 = (bbox.y1.max(0.0) as u32).min(image.height);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        Some(Self {
            x0: x0.saturating_sub(padding),
            y0: y0.saturating_sub(padding),
            x1: x1.saturating_add(padding).min(image.width),
            y1: y1.saturating_add(padding).min(image.height),
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }
}

/// External text recognizer invoked once per cell crop.
///
/// The caller owns the page image; the recognizer receives the crop
/// coordinates and returns the text found there. Implementations must bound
/// their own run time: the pipeline has no way to cancel a call.
pub trait CellRecognizer {
    /// Recognize the text inside `crop`.
    fn recognize(&self, crop: &CropBox) -> Result<String>;
}

impl<F> CellRecognizer for F
where
    F: Fn(&CropBox) -> Result<String>,
{
    fn recognize(&self, crop: &CropBox) -> Result<String> {
        self(crop)
    }
}

/// Runs the full table path for one page image.
pub struct TableRecognizer {
    grid: GridReconstructor,
    validator: TableValidator,
    escaper: MarkupEscaper,
}

impl TableRecognizer {
    /// Create a recognizer with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(GridConfig::default(), ValidatorConfig::default())
    }

    /// Create a recognizer with custom configuration.
    pub fn with_config(grid: GridConfig, validator: ValidatorConfig) -> Result<Self> {
        Ok(Self {
            grid: GridReconstructor::with_config(grid),
            validator: TableValidator::with_config(validator),
            escaper: MarkupEscaper::with_defaults()?,
        })
    }

    /// Use a specific escaper for cell text.
    pub fn with_escaper(mut self, escaper: MarkupEscaper) -> Self {
        self.escaper = escaper;
        self
    }

    /// Reconstruct, fill and validate every table; rejected tables are dropped.
    pub fn recognize<R: CellRecognizer + ?Sized>(
        &self,
        detections: &[DetectedRegion],
        image: ImageSize,
        ocr: &R,
    ) -> Vec<Table> {
        self.grid
            .reconstruct(detections, image)
            .into_iter()
            .filter_map(|mut table| {
                self.fill(&mut table, image, ocr);
                self.validator.is_table(&table).then_some(table)
            })
            .collect()
    }

    /// Recognize and render all accepted tables, separated by blank lines.
    ///
    /// Returns an empty string when no table survives.
    pub fn process<R: CellRecognizer + ?Sized>(
        &self,
        detections: &[DetectedRegion],
        image: ImageSize,
        ocr: &R,
    ) -> String {
        let tables = self.recognize(detections, image, ocr);
        log::debug!("TableRecognizer: {} tables accepted", tables.len());
        TabularRenderer::new(&self.escaper).render_all(&tables)
    }

    /// Fill cell content sequentially in reading order.
    ///
    /// Failed or degenerate crops leave the cell empty.
    pub fn fill<R: CellRecognizer + ?Sized>(&self, table: &mut Table, image: ImageSize, ocr: &R) {
        let padding = self.grid.config().crop_padding;
        for cell in &mut table.cells {
            let Some(crop) = CropBox::for_cell(&cell.bbox, image, padding) else {
                log::debug!(
                    "TableRecognizer: cell ({}, {}) has a degenerate crop",
                    cell.row,
                    cell.col
                );
                continue;
            };
            cell.content = match ocr.recognize(&crop) {
                Ok(text) => text.trim().to_string(),
                Err(e) => {
                    log::warn!(
                        "TableRecognizer: OCR failed for cell ({}, {}): {}",
                        cell.row,
                        cell.col,
                        e
                    );
                    String::new()
                }
            };
        }
    }
}

/// Recognize and render the tables on one page image with default settings.
pub fn process_table<R: CellRecognizer + ?Sized>(
    detections: &[DetectedRegion],
    image: ImageSize,
    ocr: &R,
) -> Result<String> {
    Ok(TableRecognizer::new()?.process(detections, image, ocr))
}

/// Adapter for recognizers that report failure as `None`.
pub fn optional_recognizer<F>(f: F) -> impl Fn(&CropBox) -> Result<String>
where
    F: Fn(&CropBox) -> Option<String>,
{
    move |crop: &CropBox| f(crop).ok_or_else(|| Error::Recognition("no text".to_string()))
}
