//! HNSW Vector Index for Chunk Retrieval
//!
//! Wraps the HNSW algorithm for nearest-neighbor search over chunk
//! embeddings. The index lives in memory only; it is rebuilt from the
//! persisted SQLite rows every time a corpus is loaded.
//!
//! # HNSW Parameters
//!
//! - **M**: Number of bi-directional links per node (default: 16)
//! - **efConstruction**: Candidate list size during construction (default: 200)
//! - **efSearch**: Candidate list size during search, chosen per query

use hnsw_rs::prelude::*;
use thiserror::Error;

const DEFAULT_M: usize = 16;
const DEFAULT_EF_CONSTRUCTION: usize = 200;
const MAX_LAYERS: usize = 16;

/// Errors that can occur during vector index operations
#[derive(Error, Debug)]
pub enum VectorIndexError {
    /// Invalid embedding dimension
    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension provided
        actual: usize,
    },

    /// More vectors than the index was sized for
    #[error("Index is full ({capacity} vectors)")]
    Full {
        /// Capacity given at construction
        capacity: usize,
    },
}

/// Nearest-neighbor index keyed by chunk position
///
/// Vectors are identified by insertion order: the n-th call to [`add`]
/// stores position `n`, which is the chunk's position in its corpus.
///
/// [`add`]: VectorIndex::add
///
/// # Examples
///
/// ```
/// use tally_store::vector_index::VectorIndex;
///
/// let mut index = VectorIndex::with_capacity(3, 2);
/// index.add(&[1.0, 0.0, 0.0]).unwrap();
/// index.add(&[0.0, 1.0, 0.0]).unwrap();
///
/// let results = index.search(&[1.0, 0.0, 0.0], 1, 16).unwrap();
/// assert_eq!(results[0].0, 0);
/// ```
pub struct VectorIndex {
    dimension: usize,
    capacity: usize,
    hnsw: Hnsw<'static, f32, DistCosine>,
    len: usize,
}

impl VectorIndex {
    /// Create an empty index for up to `capacity` vectors of size `dimension`
    pub fn with_capacity(dimension: usize, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let nb_layer = MAX_LAYERS.min((capacity as f32).ln().trunc() as usize).max(1);

        let hnsw = Hnsw::<'static, f32, DistCosine>::new(
            DEFAULT_M,
            capacity,
            nb_layer,
            DEFAULT_EF_CONSTRUCTION,
            DistCosine {},
        );

        Self {
            dimension,
            capacity,
            hnsw,
            len: 0,
        }
    }

    /// Vector size this index accepts
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Append a vector; returns its position
    pub fn add(&mut self, embedding: &[f32]) -> Result<usize, VectorIndexError> {
        self.check_dimension(embedding)?;
        if self.len >= self.capacity {
            return Err(VectorIndexError::Full {
                capacity: self.capacity,
            });
        }

        let position = self.len;
        let owned = embedding.to_vec();
        self.hnsw.insert((&owned, position));
        self.len += 1;

        Ok(position)
    }

    /// Search for the `k` nearest neighbors of `query`
    ///
    /// Returns `(position, similarity)` pairs, most similar first. Similarity
    /// is `1 - cosine distance`. An empty index yields no results.
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        ef_search: usize,
    ) -> Result<Vec<(usize, f32)>, VectorIndexError> {
        self.check_dimension(query)?;
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let mut results: Vec<(usize, f32)> = self
            .hnsw
            .search(query, k, ef_search.max(k))
            .into_iter()
            .map(|neighbour| (neighbour.d_id, 1.0 - neighbour.distance))
            .collect();

        results.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        results.truncate(k);

        Ok(results)
    }

    /// Number of vectors in the index
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), VectorIndexError> {
        if vector.len() != self.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_index() {
        let index = VectorIndex::with_capacity(384, 0);
        assert_eq!(index.dimension(), 384);
        assert!(index.is_empty());
        assert!(index.search(&vec![0.1; 384], 5, 64).unwrap().is_empty());
    }

    #[test]
    fn test_positions_follow_insertion_order() {
        let mut index = VectorIndex::with_capacity(3, 3);
        assert_eq!(index.add(&[1.0, 0.0, 0.0]).unwrap(), 0);
        assert_eq!(index.add(&[0.0, 1.0, 0.0]).unwrap(), 1);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut index = VectorIndex::with_capacity(384, 4);

        let result = index.add(&vec![0.1; 128]);
        assert!(matches!(result, Err(VectorIndexError::DimensionMismatch { .. })));

        let result = index.search(&vec![0.1; 128], 1, 16);
        assert!(matches!(result, Err(VectorIndexError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut index = VectorIndex::with_capacity(2, 1);
        index.add(&[1.0, 0.0]).unwrap();
        assert!(matches!(index.add(&[0.0, 1.0]), Err(VectorIndexError::Full { capacity: 1 })));
    }

    #[test]
    fn test_cosine_ranking() {
        let mut index = VectorIndex::with_capacity(3, 3);
        index.add(&[1.0, 0.0, 0.0]).unwrap();
        index.add(&[0.0, 1.0, 0.0]).unwrap();
        index.add(&[0.7071, 0.7071, 0.0]).unwrap();

        let results = index.search(&[1.0, 0.0, 0.0], 3, 64).unwrap();

        // exact, 45 degrees, orthogonal
        assert_eq!(results[0].0, 0);
        assert!(results[0].1 > 0.99);

        assert_eq!(results[1].0, 2);
        assert!(results[1].1 > 0.5);

        assert_eq!(results[2].0, 1);
        assert!(results[2].1 < 0.1);
    }

    #[test]
    fn test_k_larger_than_index() {
        let mut index = VectorIndex::with_capacity(2, 2);
        index.add(&[1.0, 0.0]).unwrap();
        index.add(&[0.0, 1.0]).unwrap();

        let results = index.search(&[1.0, 0.0], 10, 16).unwrap();
        assert_eq!(results.len(), 2);
    }
}
