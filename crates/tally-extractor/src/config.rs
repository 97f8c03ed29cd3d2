//! Configuration for the Extraction Client

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Question asked of every corpus
pub const DEFAULT_QUESTION: &str =
    "Find dates and death counts related to military forces killed in combat.";

/// Number of chunks retrieved per question
pub const DEFAULT_TOP_K: usize = 10;

/// Configuration for the Extraction Client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Retrieval question, also embedded as the search query
    pub question: String,

    /// Chunks retrieved per corpus
    pub top_k: usize,

    /// HNSW search breadth
    pub ef_search: usize,

    /// Upper bound on one LLM call (seconds)
    pub request_timeout_secs: u64,
}

impl ExtractorConfig {
    /// Get the request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.question.trim().is_empty() {
            return Err("question must not be empty".to_string());
        }
        if self.top_k == 0 {
            return Err("top_k must be greater than 0".to_string());
        }
        if self.ef_search < self.top_k {
            return Err("ef_search must be at least top_k".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            question: DEFAULT_QUESTION.to_string(),
            top_k: DEFAULT_TOP_K,
            ef_search: 64,
            request_timeout_secs: 180,
        }
    }
}
