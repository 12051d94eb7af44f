//! Reconstructed table grids.

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};

/// A table with its cells in reading order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    /// Cells sorted by `(row, col)`
    pub cells: Vec<GridCell>,

    /// Number of detected rows in the table region
    pub num_rows: usize,

    /// Number of detected columns in the table region
    pub num_cols: usize,

    /// Region the grid was built from (pixels)
    pub bbox: Rect,
}

impl Table {
    /// Create a table from cells, sorting them into reading order.
    pub fn new(mut cells: Vec<GridCell>, num_rows: usize, num_cols: usize, bbox: Rect) -> Self {
        cells.sort_by_key(|c| (c.row, c.col));
        Self {
            cells,
            num_rows,
            num_cols,
            bbox,
        }
    }

    /// Number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check if the table has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells that carry recognized text.
    pub fn filled_cells(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter().filter(|c| !c.content.trim().is_empty())
    }

    /// Check if the table has merged cells.
    pub fn has_merged_cells(&self) -> bool {
        self.cells.iter().any(|c| c.row_span > 1 || c.col_span > 1)
    }

    /// Grid dimensions derived from the cells themselves, spans included.
    pub fn extent(&self) -> (usize, usize) {
        let rows = self.cells.iter().map(|c| c.row + c.row_span).max();
        let cols = self.cells.iter().map(|c| c.col + c.col_span).max();
        (rows.unwrap_or(0), cols.unwrap_or(0))
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        let mut current_row = None;
        for cell in &self.cells {
            if current_row != Some(cell.row) {
                lines.push(String::new());
                current_row = Some(cell.row);
            } else if let Some(line) = lines.last_mut() {
                line.push('\t');
            }
            if let Some(line) = lines.last_mut() {
                line.push_str(cell.content.trim());
            }
        }
        lines.join("\n")
    }
}

/// One cell of a reconstructed grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    /// Top row index
    pub row: usize,

    /// Left column index
    pub col: usize,

    /// Rows covered (>= 1)
    pub row_span: usize,

    /// Columns covered (>= 1)
    pub col_span: usize,

    /// Cell box in page pixels
    pub bbox: Rect,

    /// Whether the cell starts on a header row
    pub is_header: bool,

    /// Recognized text; empty until filled
    #[serde(default)]
    pub content: String,
}

impl GridCell {
    /// Create a 1x1 cell.
    pub fn new(row: usize, col: usize, bbox: Rect) -> Self {
        Self {
            row,
            col,
            row_span: 1,
            col_span: 1,
            bbox,
            is_header: false,
            content: String::new(),
        }
    }

    /// Set row and column spans (clamped to at least 1).
    pub fn with_span(mut self, row_span: usize, col_span: usize) -> Self {
        self.row_span = row_span.max(1);
        self.col_span = col_span.max(1);
        self
    }

    /// Set the header flag.
    pub fn with_header(mut self, is_header: bool) -> Self {
        self.is_header = is_header;
        self
    }

    /// Set the content.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Every `(row, col)` index the cell covers.
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.row..self.row + self.row_span)
            .flat_map(move |r| (self.col..self.col + self.col_span).map(move |c| (r, c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox() -> Rect {
        Rect::new(0.0, 0.0, 10.0, 10.0)
    }

    #[test]
    fn test_table_sorts_cells() {
        let cells = vec![
            GridCell::new(1, 0, bbox()),
            GridCell::new(0, 1, bbox()),
            GridCell::new(0, 0, bbox()),
        ];
        let table = Table::new(cells, 2, 2, bbox());
        let order: Vec<_> = table.cells.iter().map(|c| (c.row, c.col)).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 0)]);
    }

    #[test]
    fn test_cell_positions() {
        let cell = GridCell::new(1, 2, bbox()).with_span(2, 3);
        let positions: Vec<_> = cell.positions().collect();
        assert_eq!(positions.len(), 6);
        assert!(positions.contains(&(2, 4)));
        assert!(!positions.contains(&(3, 2)));
    }

    #[test]
    fn test_span_clamped() {
        let cell = GridCell::new(0, 0, bbox()).with_span(0, 0);
        assert_eq!((cell.row_span, cell.col_span), (1, 1));
    }

    #[test]
    fn test_extent_and_plain_text() {
        let table = Table::new(
            vec![
                GridCell::new(0, 0, bbox()).with_span(1, 2).with_content("Head"),
                GridCell::new(1, 0, bbox()).with_content("a"),
                GridCell::new(1, 1, bbox()).with_content("b"),
            ],
            2,
            2,
            bbox(),
        );
        assert_eq!(table.extent(), (2, 2));
        assert!(table.has_merged_cells());
        assert_eq!(table.plain_text(), "Head\na\tb");
        assert_eq!(table.filled_cells().count(), 3);
    }
}
