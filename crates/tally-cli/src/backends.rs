//! Construct the embedding and LLM backends named in the configuration.
//!
//! Both are built once per invocation and shared by reference count, so the
//! indexer and the extraction client always use the same embedder.

use crate::config::{EmbeddingProvider, EmbeddingSettings, LlmBackend, LlmSettings};
use crate::error::{CliError, Result};
use std::sync::Arc;
use tally_llm::{LlmProvider, OllamaProvider, OpenAiProvider};
use tally_store::embedding::{EmbeddingModel, HashEmbeddingModel, OllamaEmbeddingModel};
use tracing::{info, warn};

/// Build the configured embedding model.
pub fn build_embedder(settings: &EmbeddingSettings) -> Arc<dyn EmbeddingModel> {
    match settings.provider {
        EmbeddingProvider::Ollama => {
            info!("Embedding with {} via {}", settings.model, settings.endpoint);
            Arc::new(OllamaEmbeddingModel::new(
                &settings.endpoint,
                &settings.model,
                settings.dimension,
            ))
        }
        EmbeddingProvider::Hash => {
            warn!("Using hash embeddings; retrieval order carries no meaning");
            Arc::new(HashEmbeddingModel::new(settings.dimension))
        }
    }
}

/// Build the configured LLM provider.
///
/// The OpenAI backend reads its key from the environment variable named by
/// `api_key_env`; a missing or empty key is a configuration error.
pub fn build_llm(settings: &LlmSettings) -> Result<Arc<dyn LlmProvider>> {
    let endpoint = settings.effective_endpoint();

    let provider: Arc<dyn LlmProvider> = match settings.provider {
        LlmBackend::OpenAi => {
            let api_key = std::env::var(&settings.api_key_env)
                .ok()
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| {
                    CliError::Config(format!(
                        "environment variable {} is not set",
                        settings.api_key_env
                    ))
                })?;

            Arc::new(
                OpenAiProvider::new(endpoint, &settings.model, api_key)
                    .with_temperature(settings.temperature)
                    .with_timeout_secs(settings.timeout_secs)
                    .with_max_retries(settings.max_retries),
            )
        }
        LlmBackend::Ollama => Arc::new(
            OllamaProvider::new(endpoint, &settings.model)
                .with_temperature(settings.temperature)
                .with_timeout_secs(settings.timeout_secs)
                .with_max_retries(settings.max_retries),
        ),
    };

    info!("Answering with {} via {}", settings.model, endpoint);
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_embedder_uses_configured_dimension() {
        let settings = EmbeddingSettings {
            provider: EmbeddingProvider::Hash,
            dimension: 48,
            ..EmbeddingSettings::default()
        };
        let embedder = build_embedder(&settings);
        assert_eq!(embedder.dimension(), 48);
        assert_eq!(embedder.model_name(), "hash-48");
    }

    #[test]
    fn test_ollama_embedder_reports_model() {
        let embedder = build_embedder(&EmbeddingSettings::default());
        assert_eq!(embedder.model_name(), "all-minilm");
        assert_eq!(embedder.dimension(), 384);
    }

    #[test]
    fn test_openai_without_key_is_a_config_error() {
        let settings = LlmSettings {
            api_key_env: "TALLY_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..LlmSettings::default()
        };
        assert!(matches!(build_llm(&settings), Err(CliError::Config(_))));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let settings = LlmSettings {
            provider: LlmBackend::Ollama,
            model: "llama3".to_string(),
            api_key_env: "TALLY_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..LlmSettings::default()
        };
        let provider = build_llm(&settings).unwrap();
        assert_eq!(provider.model_name(), "llama3");
    }
}
