//! Tally Storage Layer
//!
//! Persists one searchable chunk index per source file and loads it back.
//!
//! # Architecture
//!
//! - SQLite holds the chunk text, chunk metadata and raw embedding vectors
//!   (`<root>/<corpus>/chunks.sqlite`)
//! - HNSW answers nearest-neighbor queries; it is rebuilt in memory on load
//! - Embeddings come from an [`EmbeddingModel`] supplied by the caller
//!
//! # Examples
//!
//! ```no_run
//! use tally_store::{IndexStore, embedding::HashEmbeddingModel};
//! use tally_domain::Chunk;
//!
//! # async fn demo() -> Result<(), tally_store::StoreError> {
//! let store = IndexStore::new("results/vector_stores");
//! let embedder = HashEmbeddingModel::new(384);
//!
//! store.build("2003.txt", vec![Chunk::new("Two soldiers were killed.")], &embedder).await?;
//! let index = store.load("2003.txt", &embedder)?;
//! assert_eq!(index.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod embedding;
pub mod vector_index;

use embedding::{embed_in_batches, EmbeddingError, EmbeddingModel};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use tally_domain::{Chunk, CountryCodes, PublishedDate};
use thiserror::Error;
use tracing::{debug, info, warn};
use vector_index::{VectorIndex, VectorIndexError};

/// File name of the per-corpus database
pub const INDEX_FILE: &str = "chunks.sqlite";

/// Extension of an index still being written
const PARTIAL_EXTENSION: &str = "sqlite.partial";

/// Default number of chunks sent to the embedder per request
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No persisted index for this corpus
    #[error("No index for corpus '{corpus}' at {}", path.display())]
    NotFound {
        /// Corpus name
        corpus: String,
        /// Path that was checked
        path: PathBuf,
    },

    /// Persisted vectors and the current embedder disagree on size
    #[error("Index dimension {stored} does not match embedder dimension {embedder}")]
    DimensionMismatch {
        /// Dimension recorded when the index was built
        stored: usize,
        /// Dimension of the embedder used to query it
        embedder: usize,
    },

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Vector index rejected a vector
    #[error("Vector index error: {0}")]
    VectorIndex(#[from] VectorIndexError),
}

/// A retrieved chunk with its similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    /// The chunk as it was indexed
    pub chunk: Chunk,
    /// Cosine similarity to the query (higher is closer)
    pub score: f32,
}

/// A loaded, searchable index over one corpus
pub struct ChunkIndex {
    corpus: String,
    model_name: String,
    chunks: Vec<Chunk>,
    vectors: VectorIndex,
}

impl ChunkIndex {
    /// Corpus (source file) name
    pub fn corpus(&self) -> &str {
        &self.corpus
    }

    /// Embedding model the index was built with
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Embedding dimension
    pub fn dimension(&self) -> usize {
        self.vectors.dimension()
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Check if the index has no chunks
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// All chunks in corpus order
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Top-`k` chunks by similarity to `query`, most similar first
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        ef_search: usize,
    ) -> Result<Vec<ScoredChunk>, StoreError> {
        let hits = self.vectors.search(query, k, ef_search)?;

        hits.into_iter()
            .map(|(position, score)| {
                let chunk = self.chunks.get(position).cloned().ok_or_else(|| {
                    StoreError::InvalidData(format!("vector {} has no chunk", position))
                })?;
                Ok(ScoredChunk { chunk, score })
            })
            .collect()
    }
}

/// Directory of per-corpus chunk indexes
///
/// # Thread Safety
///
/// Each call opens its own SQLite connection; nothing is held between calls.
#[derive(Debug, Clone)]
pub struct IndexStore {
    root: PathBuf,
    batch_size: usize,
}

impl IndexStore {
    /// Create a store rooted at `root` (created lazily on first build)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set how many chunks are embedded per request
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Root directory of all indexes
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Database path for `corpus`
    pub fn index_path(&self, corpus: &str) -> PathBuf {
        self.root.join(corpus).join(INDEX_FILE)
    }

    /// Whether an index for `corpus` has been persisted
    pub fn exists(&self, corpus: &str) -> bool {
        self.index_path(corpus).is_file()
    }

    /// Embed `chunks` and persist them as the index for `corpus`
    ///
    /// Any existing index for the corpus is replaced. An empty chunk list
    /// yields a valid, empty index.
    pub async fn build(
        &self,
        corpus: &str,
        chunks: Vec<Chunk>,
        embedder: &dyn EmbeddingModel,
    ) -> Result<ChunkIndex, StoreError> {
        validate_corpus_name(corpus)?;

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = embed_in_batches(embedder, &texts, self.batch_size).await?;
        let dimension = embedder.dimension();

        let mut vectors = VectorIndex::with_capacity(dimension, chunks.len());
        for embedding in &embeddings {
            vectors.add(embedding)?;
        }

        self.write(corpus, embedder.model_name(), dimension, &chunks, &embeddings)?;

        info!(
            "Indexed {} chunks for {} ({}, {} dims)",
            chunks.len(),
            corpus,
            embedder.model_name(),
            dimension
        );

        Ok(ChunkIndex {
            corpus: corpus.to_string(),
            model_name: embedder.model_name().to_string(),
            chunks,
            vectors,
        })
    }

    /// Load the persisted index for `corpus`
    ///
    /// Fails when `embedder` produces vectors of a different size than the
    /// ones stored; a different model name of the same size only warns.
    pub fn load(
        &self,
        corpus: &str,
        embedder: &dyn EmbeddingModel,
    ) -> Result<ChunkIndex, StoreError> {
        validate_corpus_name(corpus)?;

        let path = self.index_path(corpus);
        if !path.is_file() {
            return Err(StoreError::NotFound {
                corpus: corpus.to_string(),
                path,
            });
        }

        let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

        let dimension: usize = read_meta(&conn, "dimension")?
            .parse()
            .map_err(|e| StoreError::InvalidData(format!("dimension: {}", e)))?;
        let model_name = read_meta(&conn, "model")?;

        if dimension != embedder.dimension() {
            return Err(StoreError::DimensionMismatch {
                stored: dimension,
                embedder: embedder.dimension(),
            });
        }
        if model_name != embedder.model_name() {
            warn!(
                "Index for {} was built with {}, querying with {}",
                corpus,
                model_name,
                embedder.model_name()
            );
        }

        let mut stmt = conn.prepare(
            "SELECT content, country_codes, published_date, embedding
             FROM chunks ORDER BY position",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Vec<u8>>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut chunks = Vec::with_capacity(rows.len());
        let mut vectors = VectorIndex::with_capacity(dimension, rows.len());

        for (content, codes, date, blob) in rows {
            let country_codes = match codes {
                Some(raw) => Some(CountryCodes::parse(&raw).ok_or_else(|| {
                    StoreError::InvalidData(format!("bad country codes '{}'", raw))
                })?),
                None => None,
            };

            chunks.push(
                Chunk::new(content)
                    .with_country_codes(country_codes)
                    .with_published_date(date.map(PublishedDate::new)),
            );
            vectors.add(&decode_embedding(&blob)?)?;
        }

        debug!("Loaded {} chunks for {} from {}", chunks.len(), corpus, path.display());

        Ok(ChunkIndex {
            corpus: corpus.to_string(),
            model_name,
            chunks,
            vectors,
        })
    }

    /// Write the index beside its final path, then rename it into place.
    ///
    /// A failed write leaves any previous index untouched and no
    /// `chunks.sqlite` for [`IndexStore::exists`] to mistake for a built one.
    fn write(
        &self,
        corpus: &str,
        model_name: &str,
        dimension: usize,
        chunks: &[Chunk],
        embeddings: &[Vec<f32>],
    ) -> Result<(), StoreError> {
        let path = self.index_path(corpus);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let partial = path.with_extension(PARTIAL_EXTENSION);
        if let Err(e) = write_database(&partial, corpus, model_name, dimension, chunks, embeddings) {
            if partial.is_file() {
                let _ = std::fs::remove_file(&partial);
            }
            return Err(e);
        }

        if path.exists() {
            warn!("Replacing existing index at {}", path.display());
        }
        std::fs::rename(&partial, &path)?;

        Ok(())
    }
}

fn write_database(
    path: &Path,
    corpus: &str,
    model_name: &str,
    dimension: usize,
    chunks: &[Chunk],
    embeddings: &[Vec<f32>],
) -> Result<(), StoreError> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }

    let mut conn = Connection::open(path)?;
    conn.execute_batch(include_str!("schema.sql"))?;

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO index_meta (key, value) VALUES ('model', ?1), ('dimension', ?2), ('corpus', ?3)",
        params![model_name, dimension.to_string(), corpus],
    )?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO chunks (position, content, country_codes, published_date, embedding)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for (position, (chunk, embedding)) in chunks.iter().zip(embeddings).enumerate() {
            stmt.execute(params![
                position as i64,
                chunk.content,
                chunk.country_codes.as_ref().map(|c| c.to_string()),
                chunk.published_date.as_ref().map(|d| d.as_str()),
                encode_embedding(embedding),
            ])?;
        }
    }
    tx.commit()?;
    conn.close().map_err(|(_, e)| StoreError::Database(e))?;

    Ok(())
}

fn read_meta(conn: &Connection, key: &str) -> Result<String, StoreError> {
    conn.query_row(
        "SELECT value FROM index_meta WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| StoreError::InvalidData(format!("missing index metadata '{}'", key)))
}

/// Corpus names become directory names, so they must be a single path segment
fn validate_corpus_name(corpus: &str) -> Result<(), StoreError> {
    if corpus.is_empty()
        || corpus == "."
        || corpus == ".."
        || corpus.contains('/')
        || corpus.contains('\\')
    {
        return Err(StoreError::InvalidData(format!(
            "invalid corpus name '{}'",
            corpus
        )));
    }
    Ok(())
}

fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_embedding(bytes: &[u8]) -> Result<Vec<f32>, StoreError> {
    if bytes.len() % 4 != 0 {
        return Err(StoreError::InvalidData(format!(
            "embedding blob of {} bytes is not a whole number of f32s",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}
