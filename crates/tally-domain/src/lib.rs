//! Tally Domain Layer
//!
//! Core value types shared by every stage of the casualty-extraction pipeline.
//! Like a classic domain layer it has no external dependencies: the chunking,
//! storage, LLM and reporting crates all depend on it, never the other way
//! around.
//!
//! ## Key Concepts
//!
//! - **Chunk**: a bounded text span prepared for embedding and retrieval,
//!   optionally tagged with article-level metadata
//! - **CountryCodes**: an ordered pair of two-letter country identifiers
//! - **PublishedDate**: the literal publication date found in an article header
//! - **ExtractedFact**: one (date, death count, countries) row asserted by the LLM
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Plain data plus small invariants
//! - Trait definitions for the collaborators that persist results

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod fact;
pub mod traits;

// Re-exports for convenience
pub use chunk::{Chunk, CountryCodes, PublishedDate};
pub use fact::{ExtractedFact, REPORT_HEADER};
pub use traits::FactSink;
