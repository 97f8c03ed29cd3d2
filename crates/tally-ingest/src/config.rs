//! Configuration for the Chunker

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default maximum chunk length (characters)
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default overlap between neighbouring chunks (characters)
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Yearly dumps that carry section headers with country codes and dated articles
const DEFAULT_TAGGED_ERAS: [&str; 10] = [
    "2002.txt", "2003.txt", "2004.txt", "2005.txt", "2006.txt",
    "2007.txt", "2008.txt", "2009.txt", "2010.txt", "2011.txt",
];

/// Configuration for the Chunker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Maximum chunk length (characters)
    pub chunk_size: usize,

    /// Overlap carried between neighbouring chunks (characters)
    pub chunk_overlap: usize,

    /// File names that take the tagged-era path
    pub tagged_eras: BTreeSet<String>,
}

impl ChunkerConfig {
    /// Whether `filename` belongs to the tagged-era allow-list
    pub fn is_tagged_era(&self, filename: &str) -> bool {
        self.tagged_eras.contains(filename)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be greater than 0".to_string());
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            ));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str)
            .map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            tagged_eras: DEFAULT_TAGGED_ERAS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ChunkerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tagged_eras.len(), 10);
    }

    #[test]
    fn test_era_membership_is_by_exact_name() {
        let config = ChunkerConfig::default();
        assert!(config.is_tagged_era("2003.txt"));
        assert!(!config.is_tagged_era("2012.txt"));
        assert!(!config.is_tagged_era("data/2003.txt"));
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        let config = ChunkerConfig {
            chunk_size: 100,
            chunk_overlap: 100,
            ..ChunkerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_chunk_size() {
        let config = ChunkerConfig {
            chunk_size: 0,
            chunk_overlap: 0,
            ..ChunkerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ChunkerConfig::from_toml("chunk_size = 500\nchunk_overlap = 50").unwrap();
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 50);
        assert!(config.is_tagged_era("2005.txt"));
    }

    #[test]
    fn test_custom_era_list() {
        let config = ChunkerConfig::from_toml(r#"tagged_eras = ["1999.txt"]"#).unwrap();
        assert!(config.is_tagged_era("1999.txt"));
        assert!(!config.is_tagged_era("2003.txt"));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ChunkerConfig::default();
        let toml_str = config.to_toml().unwrap();
        let parsed = ChunkerConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }
}
