//! Error types for the docweave library.

use std::io;
use thiserror::Error;

/// Result type alias for docweave operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reconstructing or serializing a document.
///
/// Structural inference itself never fails: missing detections, degenerate
/// geometry and OCR failures all degrade to "no table" or empty content.
/// These variants cover the fallible edges around it.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON input or output.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A heuristic pattern failed to compile.
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Input that cannot be processed as given, such as a malformed page range.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The external text recognizer reported a failure for one crop.
    #[error("Recognition error: {0}")]
    Recognition(String),

    /// Error during rendering (markup, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),
}
