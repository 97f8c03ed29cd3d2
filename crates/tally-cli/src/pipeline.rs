//! The two-phase pipeline: index every file, then extract from every index.
//!
//! Files are processed one at a time. A failing file is recorded in the
//! phase's [`BatchReport`] and the walk continues with the next one.

use crate::error::{CliError, Result};
use anyhow::Context;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tally_domain::FactSink;
use tally_extractor::{parse_answer, CsvSink, ExtractionClient};
use tally_ingest::{discover_documents, read_document, Chunker};
use tally_store::embedding::EmbeddingModel;
use tally_store::IndexStore;
use tracing::{error, info, warn};

/// Pipeline phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Chunk, embed, persist
    Index,
    /// Retrieve, ask, parse, append
    Extract,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Index => write!(f, "index"),
            Stage::Extract => write!(f, "extract"),
        }
    }
}

/// Result of one file in one phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileStatus {
    /// Processed; `detail` summarises what was produced
    Ok {
        /// e.g. "42 chunks" or "3 rows"
        detail: String,
    },
    /// Deliberately not processed
    Skipped {
        /// Why it was skipped
        reason: String,
    },
    /// Processing failed; later files were still attempted
    Failed {
        /// Error chain, outermost first
        error: String,
    },
}

/// One file's outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileOutcome {
    /// Path of the input file
    pub file: PathBuf,
    /// What happened
    #[serde(flatten)]
    pub status: FileStatus,
}

/// Per-file outcomes of one phase, in processing order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    /// Phase these outcomes belong to
    pub stage: Stage,
    /// One entry per discovered file
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    /// Empty report for `stage`.
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            outcomes: Vec::new(),
        }
    }

    fn record(&mut self, file: &Path, status: FileStatus) {
        self.outcomes.push(FileOutcome {
            file: file.to_path_buf(),
            status,
        });
    }

    /// Files processed successfully.
    pub fn succeeded(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Ok { .. }))
    }

    /// Files skipped.
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Skipped { .. }))
    }

    /// Files that failed.
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Failed { .. }))
    }

    /// True when no file failed.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Turn failures into [`CliError::PartialFailure`].
    pub fn ensure_success(&self) -> Result<()> {
        if self.is_success() {
            return Ok(());
        }
        Err(CliError::PartialFailure {
            stage: self.stage,
            failed: self.failed(),
            total: self.outcomes.len(),
        })
    }

    fn count(&self, pred: impl Fn(&FileStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Index and extraction over a directory of archive files.
pub struct Pipeline {
    chunker: Chunker,
    store: IndexStore,
    embedder: Arc<dyn EmbeddingModel>,
}

impl Pipeline {
    /// Create a pipeline. `embedder` must be the one the extraction client uses.
    pub fn new(chunker: Chunker, store: IndexStore, embedder: Arc<dyn EmbeddingModel>) -> Self {
        Self {
            chunker,
            store,
            embedder,
        }
    }

    /// Shared embedder, for building an extraction client over the same vectors.
    pub fn embedder(&self) -> Arc<dyn EmbeddingModel> {
        Arc::clone(&self.embedder)
    }

    /// Build and persist an index for every file under `data_dir`.
    ///
    /// With `skip_existing`, files whose index is already on disk are left
    /// alone, which makes an interrupted run cheap to resume.
    pub async fn build_indexes(&self, data_dir: &Path, skip_existing: bool) -> Result<BatchReport> {
        let files = discover_documents(data_dir)?;
        warn_on_name_collisions(&files);

        let mut report = BatchReport::new(Stage::Index);
        for path in &files {
            let corpus = corpus_name(path);

            if skip_existing && self.store.exists(&corpus) {
                info!("Index for {} exists, skipping", corpus);
                report.record(path, FileStatus::Skipped {
                    reason: "index exists".to_string(),
                });
                continue;
            }

            match self.index_file(path, &corpus).await {
                Ok(chunks) => {
                    info!("Created index for {} ({} chunks)", path.display(), chunks);
                    report.record(path, FileStatus::Ok {
                        detail: format!("{} chunks", chunks),
                    });
                }
                Err(e) => {
                    error!("{:#}", e);
                    report.record(path, FileStatus::Failed {
                        error: format!("{:#}", e),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Query the index of every file under `data_dir` and append the parsed
    /// facts to `sink`.
    pub async fn extract_and_save(
        &self,
        data_dir: &Path,
        client: &ExtractionClient,
        sink: &mut CsvSink,
    ) -> Result<BatchReport> {
        let files = discover_documents(data_dir)?;

        let mut report = BatchReport::new(Stage::Extract);
        for path in &files {
            let corpus = corpus_name(path);

            match self.extract_file(&corpus, client, sink).await {
                Ok(rows) => {
                    info!("Saved {} rows for {} to {}", rows, path.display(), sink.path().display());
                    report.record(path, FileStatus::Ok {
                        detail: format!("{} rows", rows),
                    });
                }
                Err(e) => {
                    error!("{:#}", e);
                    report.record(path, FileStatus::Failed {
                        error: format!("{:#}", e),
                    });
                }
            }
        }

        Ok(report)
    }

    async fn index_file(&self, path: &Path, corpus: &str) -> anyhow::Result<usize> {
        let document = read_document(path)?;
        let chunks = self.chunker.chunk_document(&document);
        let count = chunks.len();

        self.store
            .build(corpus, chunks, self.embedder.as_ref())
            .await
            .with_context(|| format!("indexing {}", path.display()))?;

        Ok(count)
    }

    async fn extract_file(
        &self,
        corpus: &str,
        client: &ExtractionClient,
        sink: &mut CsvSink,
    ) -> anyhow::Result<usize> {
        let index = self
            .store
            .load(corpus, self.embedder.as_ref())
            .with_context(|| format!("loading index for {}", corpus))?;

        let response = client
            .query(&index)
            .await
            .with_context(|| format!("querying {}", corpus))?;

        let facts = parse_answer(&response.result);
        if response.metadata.llm_called && facts.is_empty() {
            warn!("Answer for {} contained no fact blocks", corpus);
        }

        let rows = sink
            .append(&facts)
            .with_context(|| format!("writing facts for {}", corpus))?;

        Ok(rows)
    }
}

/// Indexes are keyed by bare file name
fn corpus_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn warn_on_name_collisions(files: &[PathBuf]) {
    let mut seen: HashMap<String, &Path> = HashMap::new();
    for path in files {
        if let Some(first) = seen.insert(corpus_name(path), path) {
            warn!(
                "{} and {} share a file name; the later one's index replaces the earlier",
                first.display(),
                path.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut report = BatchReport::new(Stage::Index);
        report.record(Path::new("a.txt"), FileStatus::Ok { detail: "1 chunks".into() });
        report.record(Path::new("b.txt"), FileStatus::Skipped { reason: "index exists".into() });
        report.record(Path::new("c.txt"), FileStatus::Failed { error: "boom".into() });

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
        assert!(matches!(
            report.ensure_success(),
            Err(CliError::PartialFailure { stage: Stage::Index, failed: 1, total: 3 })
        ));
    }

    #[test]
    fn test_report_serializes_flat() {
        let mut report = BatchReport::new(Stage::Extract);
        report.record(Path::new("2003.txt"), FileStatus::Ok { detail: "2 rows".into() });

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["stage"], "extract");
        assert_eq!(json["outcomes"][0]["file"], "2003.txt");
        assert_eq!(json["outcomes"][0]["status"], "ok");
        assert_eq!(json["outcomes"][0]["detail"], "2 rows");
    }

    #[test]
    fn test_corpus_name_is_file_name() {
        assert_eq!(corpus_name(Path::new("data/nested/2003.txt")), "2003.txt");
    }
}
