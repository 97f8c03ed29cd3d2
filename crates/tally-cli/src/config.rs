//! Configuration management for the CLI.
//!
//! Every field has a default, so a partial `tally.toml` (or none at all)
//! is enough to run.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tally_extractor::ExtractorConfig;
use tally_ingest::ChunkerConfig;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "tally.toml";

/// Full CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input and output locations
    pub paths: PathsConfig,

    /// Chunking parameters and the tagged-era allow-list
    pub chunker: ChunkerConfig,

    /// Embedding backend
    pub embedding: EmbeddingSettings,

    /// LLM backend
    pub llm: LlmSettings,

    /// Retrieval question and limits
    pub extractor: ExtractorConfig,

    /// Terminal output
    pub output: OutputSettings,
}

/// Input and output locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Archive directory, walked recursively
    pub data_dir: PathBuf,

    /// Root for everything the pipeline writes
    pub results_dir: PathBuf,

    /// One subdirectory per indexed file
    pub vector_store_dir: PathBuf,

    /// Casualty report (appended to)
    pub report_file: PathBuf,
}

/// Embedding backend choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Ollama `/api/embed`
    Ollama,
    /// Offline deterministic hashing (no semantic signal)
    Hash,
}

/// Embedding backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Which backend to use
    pub provider: EmbeddingProvider,

    /// Ollama endpoint
    pub endpoint: String,

    /// Embedding model name
    pub model: String,

    /// Vector size the model produces
    pub dimension: usize,

    /// Chunks per embedding request
    pub batch_size: usize,
}

/// LLM backend choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// OpenAI-compatible chat completions
    OpenAi,
    /// Local Ollama
    Ollama,
}

/// LLM backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Which backend to use
    pub provider: LlmBackend,

    /// API endpoint; each backend has its own default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Model name
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Environment variable holding the API key (OpenAI only)
    pub api_key_env: String,

    /// Per-request HTTP timeout (seconds)
    pub timeout_secs: u64,

    /// Attempts per request
    pub max_retries: u32,
}

impl LlmSettings {
    /// Endpoint to use, falling back to the backend's default
    pub fn effective_endpoint(&self) -> &str {
        match (&self.endpoint, self.provider) {
            (Some(endpoint), _) => endpoint.as_str(),
            (None, LlmBackend::OpenAi) => tally_llm::openai::DEFAULT_ENDPOINT,
            (None, LlmBackend::Ollama) => tally_llm::ollama::DEFAULT_ENDPOINT,
        }
    }
}

/// Terminal output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Enable colored output
    pub color: bool,

    /// Default output format
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `./tally.toml` is used if
    /// present, otherwise built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                if !path.is_file() {
                    return Err(CliError::Config(format!(
                        "Config file {} not found",
                        path.display()
                    )));
                }
                Self::from_toml(&fs::read_to_string(path)?)?
            }
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_toml(&fs::read_to_string(DEFAULT_CONFIG_FILE)?)?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize configuration to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.chunker
            .validate()
            .map_err(|e| CliError::Config(format!("[chunker] {}", e)))?;
        self.extractor
            .validate()
            .map_err(|e| CliError::Config(format!("[extractor] {}", e)))?;

        if self.embedding.dimension == 0 {
            return Err(CliError::Config("[embedding] dimension must be greater than 0".into()));
        }
        if self.embedding.batch_size == 0 {
            return Err(CliError::Config("[embedding] batch_size must be greater than 0".into()));
        }
        if self.llm.max_retries == 0 {
            return Err(CliError::Config("[llm] max_retries must be greater than 0".into()));
        }
        if self.llm.timeout_secs == 0 {
            return Err(CliError::Config("[llm] timeout_secs must be greater than 0".into()));
        }
        Ok(())
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            results_dir: PathBuf::from("results"),
            vector_store_dir: PathBuf::from("results/vector_stores"),
            report_file: PathBuf::from("results/military_casualties.csv"),
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Ollama,
            endpoint: tally_store::embedding::DEFAULT_OLLAMA_ENDPOINT.to_string(),
            model: tally_store::embedding::DEFAULT_EMBEDDING_MODEL.to_string(),
            dimension: tally_store::embedding::DEFAULT_DIMENSION,
            batch_size: tally_store::DEFAULT_BATCH_SIZE,
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmBackend::OpenAi,
            endpoint: None,
            model: "gpt-4".to_string(),
            temperature: 0.0,
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: tally_llm::DEFAULT_TIMEOUT_SECS,
            max_retries: tally_llm::DEFAULT_MAX_RETRIES,
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}
