//! False-positive filter for reconstructed tables.
//!
//! Body text sometimes gets detected as a table. After OCR, prose betrays
//! itself: cells mostly start lowercase, or everything sits in one column.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::Table;

/// Table validator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Reject when more than this fraction of text cells start lowercase
    pub max_lowercase_ratio: f32,
    /// Reject single-column tables with more rows than this
    pub max_single_column_rows: usize,
    /// Characters marking a cell as math or markup
    pub markup_chars: Vec<char>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_lowercase_ratio: 0.8,
            max_single_column_rows: 2,
            markup_chars: vec!['\\', '$', '=', '^', '_', '{', '}'],
        }
    }
}

/// Why a table was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// No cell has content
    Empty,
    /// Cells read like running prose
    Prose {
        /// Fraction of text cells starting lowercase
        lowercase_ratio: f32,
    },
    /// A single column spanning many rows
    SingleColumn {
        /// Distinct row indices
        rows: usize,
    },
}

/// Outcome of validating a table.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accepted,
    Rejected(Rejection),
}

impl Verdict {
    /// True for an accepted table.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// Accepts or rejects content-filled tables.
#[derive(Debug, Clone, Default)]
pub struct TableValidator {
    config: ValidatorConfig,
}

impl TableValidator {
    /// Create a validator with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator with custom configuration.
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Validate a content-filled table. Never mutates it.
    pub fn validate(&self, table: &Table) -> Verdict {
        let verdict = self.check(table);
        if let Verdict::Rejected(ref reason) = verdict {
            log::debug!("TableValidator: rejected {:?}", reason);
        }
        verdict
    }

    /// Shorthand for `validate(..).is_accepted()`.
    pub fn is_table(&self, table: &Table) -> bool {
        self.validate(table).is_accepted()
    }

    fn check(&self, table: &Table) -> Verdict {
        if table.filled_cells().next().is_none() {
            return Verdict::Rejected(Rejection::Empty);
        }

        if let Some(ratio) = self.lowercase_ratio(table) {
            if ratio > self.config.max_lowercase_ratio {
                return Verdict::Rejected(Rejection::Prose {
                    lowercase_ratio: ratio,
                });
            }
        }

        let cols: HashSet<usize> = table.cells.iter().map(|c| c.col).collect();
        let rows: HashSet<usize> = table.cells.iter().map(|c| c.row).collect();
        if cols.len() <= 1 && rows.len() > self.config.max_single_column_rows {
            return Verdict::Rejected(Rejection::SingleColumn { rows: rows.len() });
        }

        Verdict::Accepted
    }

    /// Share of lettered, non-markup cells whose first letter is lowercase.
    ///
    /// `None` when no cell qualifies.
    fn lowercase_ratio(&self, table: &Table) -> Option<f32> {
        let mut counted = 0usize;
        let mut lowercase = 0usize;

        for cell in table.filled_cells() {
            if cell.content.chars().any(|c| self.config.markup_chars.contains(&c)) {
                continue;
            }
            let Some(first) = cell.content.chars().find(|c| c.is_alphabetic()) else {
                continue;
            };
            counted += 1;
            if first.is_lowercase() {
                lowercase += 1;
            }
        }

        if counted == 0 {
            None
        } else {
            Some(lowercase as f32 / counted as f32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::model::GridCell;

    fn table(contents: &[(usize, usize, &str)]) -> Table {
        let cells = contents
            .iter()
            .map(|(r, c, text)| GridCell::new(*r, *c, Rect::default()).with_content(*text))
            .collect();
        Table::new(cells, 0, 0, Rect::default())
    }

    #[test]
    fn test_empty_rejected() {
        let t = table(&[(0, 0, ""), (0, 1, "  ")]);
        assert_eq!(TableValidator::new().validate(&t), Verdict::Rejected(Rejection::Empty));
    }

    #[test]
    fn test_data_table_accepted() {
        let t = table(&[
            (0, 0, "Name"),
            (0, 1, "Value"),
            (1, 0, "alpha"),
            (1, 1, "12.5"),
            (2, 0, "Beta"),
            (2, 1, "13"),
        ]);
        assert!(TableValidator::new().is_table(&t));
    }

    #[test]
    fn test_prose_rejected() {
        let t = table(&[
            (0, 0, "the"),
            (0, 1, "cat sat"),
            (1, 0, "on the mat"),
            (1, 1, "quietly"),
        ]);
        assert!(matches!(
            TableValidator::new().validate(&t),
            Verdict::Rejected(Rejection::Prose { .. })
        ));
    }

    #[test]
    fn test_markup_cells_excluded_from_ratio() {
        let t = table(&[
            (0, 0, "x = y"),
            (0, 1, "$a_b$"),
            (1, 0, "Total"),
            (1, 1, "value"),
        ]);
        // Only "Total" and "value" count: 50% lowercase.
        assert!(TableValidator::new().is_table(&t));
    }

    #[test]
    fn test_numeric_only_accepted() {
        let t = table(&[(0, 0, "1"), (0, 1, "2"), (1, 0, "3"), (1, 1, "4")]);
        assert!(TableValidator::new().is_table(&t));
    }

    #[test]
    fn test_single_column_rejected() {
        let t = table(&[(0, 0, "A"), (1, 0, "B"), (2, 0, "C")]);
        assert_eq!(
            TableValidator::new().validate(&t),
            Verdict::Rejected(Rejection::SingleColumn { rows: 3 })
        );

        let short = table(&[(0, 0, "A"), (1, 0, "B")]);
        assert!(TableValidator::new().is_table(&short));
    }
}
