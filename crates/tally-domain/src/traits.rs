//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::ExtractedFact;

/// Trait for persisting extracted facts
///
/// Implemented by the reporting layer (tally-extractor's CSV sink).
/// Sinks are append-only: rows are never rewritten or deleted.
pub trait FactSink {
    /// Error type for sink operations
    type Error;

    /// Append a batch of facts, returning how many rows were written
    fn append(&mut self, facts: &[ExtractedFact]) -> Result<usize, Self::Error>;
}
