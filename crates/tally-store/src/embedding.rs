//! Embedding Models for Text Vectorization
//!
//! This module provides text-to-vector conversion for semantic search over
//! archive chunks. The model is constructed once by the caller and passed to
//! both the index builder and the extraction client.
//!
//! # Architecture
//!
//! - **EmbeddingModel**: async trait over a batch of texts
//! - **OllamaEmbeddingModel**: remote model served by Ollama (`all-minilm`,
//!   384 dimensions, by default). Constructing it is cheap; the first request
//!   makes Ollama load the model, which can take several seconds.
//! - **HashEmbeddingModel**: deterministic hash-based embeddings for offline
//!   runs and tests. No semantic signal.
//!
//! # Examples
//!
//! ```rust
//! use tally_store::embedding::{HashEmbeddingModel, EmbeddingModel};
//!
//! # tokio_test_block(async {
//! let model = HashEmbeddingModel::new(384);
//! let embeddings = model.embed_batch(&["The sky is blue"]).await.unwrap();
//! assert_eq!(embeddings[0].len(), 384);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;
use thiserror::Error;

/// Default Ollama API endpoint
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";

/// Default embedding model (MiniLM family, 384 dimensions)
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";

/// Dimension of the default embedding model
pub const DEFAULT_DIMENSION: usize = 384;

/// Errors that can occur during embedding generation
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Invalid input text
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Embedding service answered with an error
    #[error("API error: {0}")]
    Api(String),

    /// Service returned vectors of the wrong size or count
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension returned
        actual: usize,
    },
}

/// Trait for embedding models
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Embed a batch of texts, returning one vector per input (in order)
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Dimension of the vectors this model produces
    fn dimension(&self) -> usize;

    /// Identifier recorded alongside persisted indexes
    fn model_name(&self) -> &str;
}

/// Embed `texts` in batches of at most `batch_size`
pub async fn embed_in_batches(
    model: &dyn EmbeddingModel,
    texts: &[&str],
    batch_size: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let mut embeddings = Vec::with_capacity(texts.len());

    for batch in texts.chunks(batch_size.max(1)) {
        let vectors = model.embed_batch(batch).await?;
        if vectors.len() != batch.len() {
            return Err(EmbeddingError::Api(format!(
                "expected {} embeddings, got {}",
                batch.len(),
                vectors.len()
            )));
        }
        embeddings.extend(vectors);
    }

    Ok(embeddings)
}

/// Embedding model served by a local Ollama instance
pub struct OllamaEmbeddingModel {
    client: Client,
    endpoint: String,
    model: String,
    dimension: usize,
}

#[derive(Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbeddingModel {
    /// Create a new Ollama embedding model
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "all-minilm")
    /// - `dimension`: Expected vector size; responses of another size are rejected
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, dimension: usize) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            dimension,
        }
    }

    /// Create a model against the default endpoint with the default MiniLM model
    pub fn default_model() -> Self {
        Self::new(DEFAULT_OLLAMA_ENDPOINT, DEFAULT_EMBEDDING_MODEL, DEFAULT_DIMENSION)
    }
}

#[async_trait]
impl EmbeddingModel for OllamaEmbeddingModel {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = OllamaEmbedRequest {
            model: &self.model,
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.endpoint))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(format!("{status}: {body}")));
        }

        let parsed: OllamaEmbedResponse = response.json().await?;

        if let Some(first) = parsed.embeddings.first() {
            if first.len() != self.dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: self.dimension,
                    actual: first.len(),
                });
            }
        }

        Ok(parsed.embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Deterministic hash-based embedding model
///
/// The embeddings are:
///
/// - **Deterministic**: Same text always produces same embedding
/// - **Normalized**: All vectors have unit length (for cosine similarity)
/// - **Diverse**: Different texts produce different embeddings
///
/// They carry no semantic meaning, so retrieval quality is arbitrary. Use it
/// to exercise the pipeline without an embedding service.
pub struct HashEmbeddingModel {
    dimension: usize,
    name: String,
}

impl HashEmbeddingModel {
    /// Create a new hash embedding model
    ///
    /// # Parameters
    ///
    /// - `dimension`: The embedding dimension
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            name: format!("hash-{}", dimension),
        }
    }

    /// Hash text with a seed to get a deterministic f32 value
    fn hash_with_seed(text: &str, seed: u64) -> f32 {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        seed.hash(&mut hasher);
        let hash_value = hasher.finish();

        // Convert hash to float in range [-1, 1]
        let normalized = (hash_value as f64 / u64::MAX as f64) * 2.0 - 1.0;
        normalized as f32
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.is_empty() {
            return Err(EmbeddingError::InvalidInput(
                "Empty text cannot be embedded".to_string()
            ));
        }

        let mut embedding: Vec<f32> = (0..self.dimension)
            .map(|i| Self::hash_with_seed(text, i as u64))
            .collect();

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut embedding {
                *value /= magnitude;
            }
        }

        Ok(embedding)
    }
}

#[async_trait]
impl EmbeddingModel for HashEmbeddingModel {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed_one(text)).collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_embedding_deterministic() {
        let model = HashEmbeddingModel::new(384);

        let text = "Coalition forces crossed the border";
        let first = model.embed_batch(&[text]).await.unwrap();
        let second = model.embed_batch(&[text]).await.unwrap();

        assert_eq!(first, second, "Same text should produce same embedding");
    }

    #[tokio::test]
    async fn test_hash_embedding_dimension_and_name() {
        let model = HashEmbeddingModel::new(128);

        let embeddings = model.embed_batch(&["test"]).await.unwrap();
        assert_eq!(embeddings[0].len(), 128);
        assert_eq!(model.dimension(), 128);
        assert_eq!(model.model_name(), "hash-128");
    }

    #[tokio::test]
    async fn test_hash_embedding_normalized() {
        let model = HashEmbeddingModel::new(384);

        let embedding = model.embed_batch(&["test text"]).await.unwrap().remove(0);
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 0.0001, "Embedding should be normalized");
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let model = HashEmbeddingModel::new(64);

        let batch = model.embed_batch(&["alpha", "beta"]).await.unwrap();
        let alpha = model.embed_batch(&["alpha"]).await.unwrap().remove(0);
        let beta = model.embed_batch(&["beta"]).await.unwrap().remove(0);

        assert_eq!(batch, vec![alpha, beta]);
    }

    #[tokio::test]
    async fn test_hash_embedding_empty_text() {
        let model = HashEmbeddingModel::new(384);

        let result = model.embed_batch(&["fine", ""]).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Empty text"));
    }

    #[tokio::test]
    async fn test_embed_in_batches_covers_all_texts() {
        let model = HashEmbeddingModel::new(16);
        let texts: Vec<String> = (0..10).map(|i| format!("text {}", i)).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();

        let embeddings = embed_in_batches(&model, &refs, 3).await.unwrap();
        assert_eq!(embeddings.len(), 10);
        assert_eq!(embeddings[9], model.embed_batch(&["text 9"]).await.unwrap()[0]);
    }

    #[tokio::test]
    async fn test_ollama_unreachable_endpoint() {
        let model = OllamaEmbeddingModel::new("http://127.0.0.1:9", "all-minilm", 384);
        let result = model.embed_batch(&["text"]).await;
        assert!(matches!(result, Err(EmbeddingError::Http(_))));
    }

    #[tokio::test]
    async fn test_ollama_empty_batch_skips_request() {
        let model = OllamaEmbeddingModel::new("http://127.0.0.1:9", "all-minilm", 384);
        let result = model.embed_batch(&[]).await.unwrap();
        assert!(result.is_empty());
    }
}
