//! Error types for the CLI application.

use crate::pipeline::Stage;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Reading or chunking input failed
    #[error(transparent)]
    Ingest(#[from] tally_ingest::IngestError),

    /// Index store error
    #[error(transparent)]
    Store(#[from] tally_store::StoreError),

    /// Extraction error
    #[error(transparent)]
    Extractor(#[from] tally_extractor::ExtractorError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Some files in a batch failed; the report has the details
    #[error("{stage} failed for {failed} of {total} file(s)")]
    PartialFailure {
        /// Phase that failed
        stage: Stage,
        /// Files that failed
        failed: usize,
        /// Files attempted
        total: usize,
    },
}
