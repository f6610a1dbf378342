//! Export errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors writing a dataset.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Could not create or write the output file.
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization failed.
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),
}
