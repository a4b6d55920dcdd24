//! Error types for the sample annotator.
//!
//! Data-quality problems found while annotating a sample are never errors:
//! they become [`Message`](crate::report::Message)s on the report. The types
//! here cover setup failures (schema, registry, configuration) and the
//! typed failures of external collaborators.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for annotator setup and export operations.
#[derive(Debug, Error)]
pub enum AnnotatorError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The schema document is structurally invalid.
    #[error("Schema error: {0}")]
    Schema(String),

    /// The prefix registry could not be built.
    #[error("Registry error for prefix '{prefix}': {message}")]
    Registry { prefix: String, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A pipeline stage failed; converted to a message at the stage boundary.
    #[error("Stage '{stage}' failed: {message}")]
    Stage { stage: &'static str, message: String },

    /// Error from the CSV writer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias for annotator operations.
pub type Result<T> = std::result::Result<T, AnnotatorError>;
