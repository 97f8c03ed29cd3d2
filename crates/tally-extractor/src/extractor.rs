//! Retrieval-augmented question answering over one chunk index

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::prompt::PromptBuilder;
use crate::types::{ExtractionMetadata, ExtractionResponse};
use std::sync::Arc;
use std::time::Instant;
use tally_llm::LlmProvider;
use tally_store::embedding::EmbeddingModel;
use tally_store::ChunkIndex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Asks the configured question of a corpus and returns the model's answer
///
/// The embedder must be the one the index was built with; the same instance
/// is normally shared with the index builder.
pub struct ExtractionClient {
    llm: Arc<dyn LlmProvider>,
    embedder: Arc<dyn EmbeddingModel>,
    config: ExtractorConfig,
}

impl ExtractionClient {
    /// Create a new client
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        embedder: Arc<dyn EmbeddingModel>,
        config: ExtractorConfig,
    ) -> Self {
        Self {
            llm,
            embedder,
            config,
        }
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Retrieve the top-k chunks for the question and ask the LLM about them
    ///
    /// An index with no matching chunks short-circuits: the LLM is not
    /// called and the answer is empty.
    pub async fn query(&self, index: &ChunkIndex) -> Result<ExtractionResponse, ExtractorError> {
        self.config.validate().map_err(ExtractorError::Config)?;
        let start = Instant::now();

        let source_documents = if index.is_empty() {
            Vec::new()
        } else {
            let query = self
                .embedder
                .embed_batch(&[self.config.question.as_str()])
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    ExtractorError::Config("embedder returned no vector for the question".to_string())
                })?;
            index.search(&query, self.config.top_k, self.config.ef_search)?
        };

        debug!(
            "Retrieved {} of {} chunks from {}",
            source_documents.len(),
            index.len(),
            index.corpus()
        );

        let llm_called = !source_documents.is_empty();
        let result = if llm_called {
            let prompt = PromptBuilder::new(&self.config.question, &source_documents).build();
            debug!("Prompt length: {} chars", prompt.len());

            match timeout(self.config.request_timeout(), self.llm.generate(&prompt)).await {
                Ok(answer) => answer?,
                Err(_) => {
                    warn!(
                        "LLM call for {} exceeded {}s",
                        index.corpus(),
                        self.config.request_timeout_secs
                    );
                    return Err(ExtractorError::Timeout(self.config.request_timeout_secs));
                }
            }
        } else {
            info!("No chunks retrieved for {}, skipping LLM call", index.corpus());
            String::new()
        };

        let metadata = ExtractionMetadata {
            corpus: index.corpus().to_string(),
            model_name: self.llm.model_name().to_string(),
            documents_retrieved: source_documents.len(),
            llm_called,
            processing_time_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            "Queried {} ({} chunks) in {} ms",
            metadata.corpus, metadata.documents_retrieved, metadata.processing_time_ms
        );

        Ok(ExtractionResponse {
            result,
            source_documents,
            metadata,
        })
    }
}
