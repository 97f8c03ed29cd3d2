//! Tally Ingest
//!
//! Turns raw news-archive dumps into retrieval-sized chunks.
//!
//! # Overview
//!
//! Archive files come in two flavours, told apart by file name only:
//!
//! - **Tagged-era** files (a closed allow-list of yearly dumps) are split into
//!   `=`-delimited sections and `-`-delimited articles. Each article's chunks
//!   are stamped with the country pair from the section header and the
//!   publication date from the article header.
//! - **General** files are split on `_` delimiter lines and chunked without
//!   metadata.
//!
//! Both paths end in the same size/overlap [`TextSplitter`].
//!
//! # Architecture
//!
//! ```text
//! file → read_document → Chunker ─┬─ tagged: sections → articles → metadata → TextSplitter
//!                                 └─ general: sections → TextSplitter
//! ```
//!
//! # Example Usage
//!
//! ```
//! use tally_ingest::{Chunker, ChunkerConfig};
//!
//! let chunker = Chunker::new(ChunkerConfig::default());
//! let chunks = chunker.chunk("notes.txt", "First report.\n_____\nSecond report.");
//!
//! assert_eq!(chunks.len(), 2);
//! assert!(chunks.iter().all(|c| c.country_codes.is_none()));
//! ```

#![warn(missing_docs)]

mod error;
mod config;
mod reader;
mod splitter;
mod chunker;
pub mod metadata;

pub use error::IngestError;
pub use config::{ChunkerConfig, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
pub use reader::{decode_latin1, discover_documents, read_document, RawDocument};
pub use splitter::TextSplitter;
pub use chunker::{ChunkPath, Chunker};
pub use metadata::{extract_country_codes, extract_metadata, extract_published_date, ArticleMetadata};
