//! Tally Extractor
//!
//! Turns a per-file chunk index into casualty report rows using an LLM.
//!
//! # Architecture
//!
//! ```text
//! ChunkIndex → retrieve top-k → stuff prompt → LLM → parse_answer → CsvSink
//! ```
//!
//! The question is fixed per run (configurable). Each retrieved chunk is
//! rendered with its publication date and country pair so the model can
//! date incidents and name the countries involved.
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use tally_domain::FactSink;
//! use tally_extractor::{parse_answer, CsvSink, ExtractionClient, ExtractorConfig};
//! use tally_llm::MockProvider;
//! use tally_store::{embedding::HashEmbeddingModel, IndexStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let embedder = Arc::new(HashEmbeddingModel::new(384));
//! let llm = Arc::new(MockProvider::new("- Date: 2003-03-20\n- Death Count: 3\n- Countries involved: US, Iraq\n\n"));
//!
//! let index = IndexStore::new("results/vector_stores").load("2003.txt", embedder.as_ref())?;
//! let client = ExtractionClient::new(llm, embedder, ExtractorConfig::default());
//!
//! let response = client.query(&index).await?;
//! let facts = parse_answer(&response.result);
//!
//! let mut sink = CsvSink::new("results/military_casualties.csv");
//! sink.append(&facts)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod parser;
mod prompt;
mod sink;
mod types;


pub use config::{ExtractorConfig, DEFAULT_QUESTION, DEFAULT_TOP_K};
pub use error::ExtractorError;
pub use extractor::ExtractionClient;
pub use parser::parse_answer;
pub use prompt::PromptBuilder;
pub use sink::CsvSink;
pub use types::{ExtractionMetadata, ExtractionResponse};
