//! Error types for the campaign report pipeline.
//!
//! - [`LoadError`] - Dataset loading errors (schema, values, IO)
//! - [`ExportError`] - CSV export errors
//! - [`PipelineError`] - Top-level orchestration errors
//! - [`ServerError`] - HTTP layer errors
//!
//! CSV syntax errors live next to the parser as [`crate::parser::CsvError`].
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

use crate::dataset::Dataset;
use crate::parser::CsvError;

// =============================================================================
// Loading Errors
// =============================================================================

/// Errors while turning a CSV file into typed records.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("Cannot read {dataset} file '{}': {source}", .path.display())]
    Io {
        dataset: Dataset,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid CSV.
    #[error("{dataset} file ({}): {source}", .dataset.file_name())]
    Csv {
        dataset: Dataset,
        #[source]
        source: CsvError,
    },

    /// Required columns are absent from the header row.
    #[error(
        "{dataset} file ({}) is missing column(s) [{}]; expected columns: {}",
        .dataset.file_name(),
        .missing.join(", "),
        .dataset.columns().join(", ")
    )]
    MissingColumns {
        dataset: Dataset,
        missing: Vec<String>,
    },

    /// A cell could not be converted to the expected type.
    #[error(
        "{dataset} file ({}), line {line}, column '{column}' (value '{value}'): {message}",
        .dataset.file_name()
    )]
    InvalidValue {
        dataset: Dataset,
        line: usize,
        column: String,
        value: String,
        message: String,
    },
}

impl LoadError {
    /// Dataset the error belongs to.
    pub fn dataset(&self) -> Dataset {
        match self {
            LoadError::Io { dataset, .. }
            | LoadError::Csv { dataset, .. }
            | LoadError::MissingColumns { dataset, .. }
            | LoadError::InvalidValue { dataset, .. } => *dataset,
        }
    }
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while writing the ROAS export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV writer failure.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// Writer could not be flushed into a buffer.
    #[error("CSV buffer error: {0}")]
    Buffer(String),

    /// Output was not valid UTF-8.
    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Output file could not be written.
    #[error("Cannot write export: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error type returned by [`crate::pipeline::build_report`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Dataset loading error.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
