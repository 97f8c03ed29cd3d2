//! Error types for ingestion

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading archive files
///
/// Chunking itself never fails: unmatched delimiters or patterns degrade to
/// absent metadata or fewer chunks.
#[derive(Error, Debug)]
pub enum IngestError {
    /// File could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Data directory could not be walked
    #[error("Failed to walk {}: {message}", path.display())]
    Walk {
        /// Root being walked
        path: PathBuf,
        /// Walk error description
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
