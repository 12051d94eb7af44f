//! Table structure recognition.
//!
//! Detections for one page image flow through [`GridReconstructor`] into
//! cell grids, an external [`CellRecognizer`] fills each cell, and
//! [`TableValidator`] discards grids that turn out to be prose. Accepted
//! tables render through [`crate::render::TabularRenderer`].

mod grid;
mod recognizer;
mod validator;

pub use grid::{GridConfig, GridReconstructor};
pub use recognizer::{
    optional_recognizer, process_table, CellRecognizer, CropBox, TableRecognizer,
};
pub use validator::{Rejection, TableValidator, ValidatorConfig, Verdict};
