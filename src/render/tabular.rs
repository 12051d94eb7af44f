//! Tabular markup for reconstructed tables.

use crate::model::{GridCell, Table};

use super::MarkupEscaper;

/// One slot of the occupancy grid.
#[derive(Clone, Copy)]
enum Slot<'a> {
    Empty,
    Origin(&'a GridCell),
    Covered,
}

/// Renders content-filled tables as bordered tabular markup.
pub struct TabularRenderer<'e> {
    escaper: &'e MarkupEscaper,
}

impl<'e> TabularRenderer<'e> {
    /// Create a renderer that escapes cell text with `escaper`.
    pub fn new(escaper: &'e MarkupEscaper) -> Self {
        Self { escaper }
    }

    /// Render one table. Returns an empty string for a table without cells.
    pub fn render(&self, table: &Table) -> String {
        let (rows, cols) = table.extent();
        if rows == 0 || cols == 0 {
            return String::new();
        }

        let grid = occupancy(table, rows, cols);

        let mut out = String::new();
        out.push_str("\\begin{center}\n");
        out.push_str(&format!("\\begin{{tabular}}{{|{}}}\n", "c|".repeat(cols)));
        out.push_str("\\hline\n");

        for row in &grid {
            let mut items: Vec<String> = Vec::with_capacity(cols);
            let mut c = 0;
            while c < cols {
                match row[c] {
                    Slot::Origin(cell) => {
                        items.push(self.render_cell(cell, c == 0));
                        c += cell.col_span;
                    }
                    Slot::Empty | Slot::Covered => {
                        items.push(" ".to_string());
                        c += 1;
                    }
                }
            }
            out.push_str(&items.join(" & "));
            out.push_str(" \\\\\n\\hline\n");
        }

        out.push_str("\\end{tabular}\n");
        out.push_str("\\end{center}");
        out
    }

    /// Render several tables separated by blank lines.
    pub fn render_all<'t>(&self, tables: impl IntoIterator<Item = &'t Table>) -> String {
        tables
            .into_iter()
            .map(|t| self.render(t))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn render_cell(&self, cell: &GridCell, first_column: bool) -> String {
        let mut text = self.escaper.escape(&clean_cell_content(&cell.content));

        if cell.is_header && !text.is_empty() && !text.starts_with("\\textbf") && !text.contains('$')
        {
            text = format!("\\textbf{{{}}}", text);
        }

        if cell.row_span > 1 {
            text = format!("\\multirow{{{}}}{{*}}{{{}}}", cell.row_span, text);
        }
        if cell.col_span > 1 {
            let align = if first_column { "|c|" } else { "c|" };
            text = format!("\\multicolumn{{{}}}{{{}}}{{{}}}", cell.col_span, align, text);
        }
        text
    }
}

/// Mark each cell's origin and the slots its spans cover.
fn occupancy(table: &Table, rows: usize, cols: usize) -> Vec<Vec<Slot<'_>>> {
    let mut grid = vec![vec![Slot::Empty; cols]; rows];
    for cell in &table.cells {
        for (r, c) in cell.positions() {
            if !matches!(grid[r][c], Slot::Empty) {
                log::warn!("TabularRenderer: slot ({}, {}) claimed twice", r, c);
                continue;
            }
            grid[r][c] = if (r, c) == (cell.row, cell.col) {
                Slot::Origin(cell)
            } else {
                Slot::Covered
            };
        }
    }
    grid
}

/// Drop inline formatting tags and line breaks OCR leaves in cell text.
pub fn clean_cell_content(text: &str) -> String {
    let mut text = text.to_string();
    for tag in ["<b>", "</b>", "<i>", "</i>", "<u>", "</u>"] {
        text = text.replace(tag, "");
    }
    for br in ["<br>", "<br/>", "<br />"] {
        text = text.replace(br, " ");
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::render::EscapeOptions;

    fn escaper() -> MarkupEscaper {
        MarkupEscaper::new(EscapeOptions::minimal()).unwrap()
    }

    fn cell(row: usize, col: usize, text: &str) -> GridCell {
        GridCell::new(row, col, Rect::default()).with_content(text)
    }

    #[test]
    fn test_simple_table() {
        let table = Table::new(
            vec![cell(0, 0, "a"), cell(0, 1, "b"), cell(1, 0, "c"), cell(1, 1, "d")],
            2,
            2,
            Rect::default(),
        );
        let e = escaper();
        let out = TabularRenderer::new(&e).render(&table);
        assert_eq!(
            out,
            "\\begin{center}\n\\begin{tabular}{|c|c|}\n\\hline\na & b \\\\\n\\hline\nc & d \\\\\n\\hline\n\\end{tabular}\n\\end{center}"
        );
    }

    #[test]
    fn test_header_and_colspan() {
        let table = Table::new(
            vec![
                cell(0, 0, "Head").with_span(1, 2).with_header(true),
                cell(1, 0, "x"),
                cell(1, 1, "y"),
            ],
            2,
            2,
            Rect::default(),
        );
        let e = escaper();
        let out = TabularRenderer::new(&e).render(&table);
        assert!(out.contains("\\multicolumn{2}{|c|}{\\textbf{Head}} \\\\"));
        assert!(out.contains("x & y \\\\"));
    }

    #[test]
    fn test_rowspan_placeholder() {
        let table = Table::new(
            vec![
                cell(0, 0, "Tall").with_span(2, 1),
                cell(0, 1, "a"),
                cell(1, 1, "b"),
            ],
            2,
            2,
            Rect::default(),
        );
        let e = escaper();
        let out = TabularRenderer::new(&e).render(&table);
        assert!(out.contains("\\multirow{2}{*}{Tall} & a \\\\"));
        assert!(out.contains("\n  & b \\\\"));
    }

    #[test]
    fn test_nested_spans() {
        let table = Table::new(
            vec![cell(0, 1, "Big").with_span(2, 2), cell(0, 0, "a"), cell(1, 0, "b")],
            2,
            3,
            Rect::default(),
        );
        let e = escaper();
        let out = TabularRenderer::new(&e).render(&table);
        assert!(out.contains("a & \\multicolumn{2}{c|}{\\multirow{2}{*}{Big}} \\\\"));
        assert!(out.contains("b &   &   \\\\"));
    }

    #[test]
    fn test_header_with_math_not_bold() {
        let table = Table::new(
            vec![cell(0, 0, "$x$").with_header(true)],
            1,
            1,
            Rect::default(),
        );
        let e = escaper();
        let out = TabularRenderer::new(&e).render(&table);
        assert!(out.contains("\n$x$ \\\\"));
    }

    #[test]
    fn test_empty_table() {
        let e = escaper();
        assert_eq!(TabularRenderer::new(&e).render(&Table::default()), "");
    }

    #[test]
    fn test_clean_cell_content() {
        assert_eq!(clean_cell_content("<b>Total</b><br>sum\n  of  <u>all</u>"), "Total sum of all");
    }
}
