//! Error types for the Extractor

use tally_llm::LlmError;
use tally_store::embedding::EmbeddingError;
use tally_store::StoreError;
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Index store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Embedding the question failed
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// The LLM call did not finish in time
    #[error("Extraction timed out after {0}s")]
    Timeout(u64),

    /// Writing the report failed
    #[error("Report error: {0}")]
    Sink(#[from] csv::Error),

    /// Filesystem error around the report file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
