//! Extraction response types

use serde::Serialize;
use tally_store::ScoredChunk;

/// What one query over one corpus produced
#[derive(Debug, Clone)]
pub struct ExtractionResponse {
    /// Raw answer text from the LLM (empty when nothing was retrieved)
    pub result: String,

    /// Retrieved chunks that were placed in the prompt, most similar first
    pub source_documents: Vec<ScoredChunk>,

    /// Bookkeeping about the call
    pub metadata: ExtractionMetadata,
}

/// Metadata about an extraction call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionMetadata {
    /// Corpus that was queried
    pub corpus: String,

    /// Model that answered
    pub model_name: String,

    /// Number of chunks retrieved
    pub documents_retrieved: usize,

    /// Whether the LLM was actually called
    pub llm_called: bool,

    /// Wall-clock time of the query (milliseconds)
    pub processing_time_ms: u64,
}
