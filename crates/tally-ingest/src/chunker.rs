//! Archive chunking: era dispatch, section/article parsing, metadata stamping

use crate::config::ChunkerConfig;
use crate::metadata::extract_metadata;
use crate::reader::RawDocument;
use crate::splitter::TextSplitter;
use regex::Regex;
use std::sync::LazyLock;
use tally_domain::Chunk;
use tracing::debug;

/// A line of `=` characters separating header and body blocks
static TAGGED_SECTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n=+\n").unwrap());

/// A line of `-` characters separating articles inside a body block
static ARTICLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n-+\n").unwrap());

/// Classifier footer line that ends an article's header
static SCORE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"SVM score:.*\n").unwrap());

/// A line of `_` characters separating documents in general dumps
static GENERAL_SECTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n_+\n").unwrap());

/// Which chunking algorithm a file takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkPath {
    /// Section/article parsing with country and date metadata
    TaggedEra,
    /// Plain delimiter split, no metadata
    General,
}

/// Splits archive files into retrieval chunks
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkerConfig,
    splitter: TextSplitter,
}

impl Chunker {
    /// Create a new chunker
    pub fn new(config: ChunkerConfig) -> Self {
        let splitter = TextSplitter::new(config.chunk_size, config.chunk_overlap);
        Self { config, splitter }
    }

    /// The active configuration
    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Decide the path from the file name alone
    pub fn path_for(&self, filename: &str) -> ChunkPath {
        if self.config.is_tagged_era(filename) {
            ChunkPath::TaggedEra
        } else {
            ChunkPath::General
        }
    }

    /// Chunk a document that has already been read
    pub fn chunk_document(&self, document: &RawDocument) -> Vec<Chunk> {
        self.chunk(&document.filename, &document.content)
    }

    /// Chunk `content`, choosing the path from `filename`
    pub fn chunk(&self, filename: &str, content: &str) -> Vec<Chunk> {
        let path = self.path_for(filename);
        let chunks = match path {
            ChunkPath::TaggedEra => self.chunk_tagged(content),
            ChunkPath::General => self.chunk_general(content),
        };

        debug!(
            "Chunked {} via {:?} path into {} chunks",
            filename,
            path,
            chunks.len()
        );

        chunks
    }

    /// Tagged-era files alternate header and body blocks after a two-entry
    /// preamble. Only entries 2, 4, 6, ... are bodies; each takes its
    /// country pair from the entry just before it.
    fn chunk_tagged(&self, content: &str) -> Vec<Chunk> {
        let sections: Vec<&str> = TAGGED_SECTION_RE.split(content).collect();
        let mut chunks = Vec::new();

        for idx in (2..sections.len()).step_by(2) {
            let section_header = sections[idx - 1];
            let body = sections[idx].trim();

            for article in ARTICLE_RE.split(body) {
                // Without a score line the whole article is both header and body.
                let (header, text) = match SCORE_LINE_RE.find(article) {
                    Some(m) => (&article[..m.start()], &article[m.end()..]),
                    None => (article, article),
                };
                let meta = extract_metadata(section_header, header);

                for piece in self.splitter.split(text) {
                    chunks.push(
                        Chunk::new(piece)
                            .with_country_codes(meta.country_codes.clone())
                            .with_published_date(meta.published_date.clone()),
                    );
                }
            }
        }

        chunks
    }

    fn chunk_general(&self, content: &str) -> Vec<Chunk> {
        GENERAL_SECTION_RE
            .split(content)
            .flat_map(|section| self.splitter.split(section))
            .map(Chunk::new)
            .collect()
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(ChunkerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_domain::CountryCodes;

    const TAGGED_SAMPLE: &str = "\
ProQuest export
==========
Search: US-IQ
==========
Baghdad Daily
March 20, 2003, Thursday
SVM score: 0.93
Coalition forces crossed the border.
----------
Basra Herald
March 21, 2003, Friday
SVM score: 0.88
Two soldiers were killed near Basra.
==========
Search: GB-IQ
==========
London Wire
March 22, 2003, Saturday
SVM score: 0.71
British troops advanced.
";

    #[test]
    fn test_path_dispatch_is_by_name() {
        let chunker = Chunker::default();
        assert_eq!(chunker.path_for("2003.txt"), ChunkPath::TaggedEra);
        assert_eq!(chunker.path_for("ProQuestDocuments-2025.txt"), ChunkPath::General);
    }

    #[test]
    fn test_tagged_chunks_carry_article_metadata() {
        let chunker = Chunker::default();
        let chunks = chunker.chunk("2003.txt", TAGGED_SAMPLE);

        assert_eq!(chunks.len(), 3);

        assert_eq!(chunks[0].content, "Coalition forces crossed the border.");
        assert_eq!(chunks[0].country_codes, Some(CountryCodes::new("US", "IQ")));
        assert_eq!(
            chunks[0].published_date.as_ref().map(|d| d.as_str()),
            Some("March 20, 2003, Thursday")
        );

        assert_eq!(chunks[1].content, "Two soldiers were killed near Basra.");
        assert_eq!(chunks[1].country_codes, Some(CountryCodes::new("US", "IQ")));
        assert_eq!(
            chunks[1].published_date.as_ref().map(|d| d.as_str()),
            Some("March 21, 2003, Friday")
        );

        assert_eq!(chunks[2].country_codes, Some(CountryCodes::new("GB", "IQ")));
        assert_eq!(
            chunks[2].published_date.as_ref().map(|d| d.as_str()),
            Some("March 22, 2003, Saturday")
        );
    }

    #[test]
    fn test_tagged_metadata_comes_from_section_and_article_headers() {
        let chunker = Chunker::default();
        let chunks = chunker.chunk("2003.txt", TAGGED_SAMPLE);
        let expected = extract_metadata("Search: US-IQ", "Basra Herald\nMarch 21, 2003, Friday\n");

        assert_eq!(chunks[1].country_codes, expected.country_codes);
        assert_eq!(chunks[1].published_date, expected.published_date);
    }

    #[test]
    fn test_tagged_header_lines_are_not_chunked() {
        let chunker = Chunker::default();
        let chunks = chunker.chunk("2003.txt", TAGGED_SAMPLE);

        for chunk in &chunks {
            assert!(!chunk.content.contains("SVM score"));
            assert!(!chunk.content.contains("Search:"));
        }
    }

    #[test]
    fn test_same_content_general_path_has_no_metadata() {
        let chunker = Chunker::default();
        let chunks = chunker.chunk("notes.txt", TAGGED_SAMPLE);

        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| !c.has_metadata()));
    }

    #[test]
    fn test_article_without_score_line() {
        let chunker = Chunker::default();
        let content = "preamble\n===\nSearch: FR-DE\n===\nMay 1, 2004, Saturday Talks resumed.\n";
        let chunks = chunker.chunk("2004.txt", content);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "May 1, 2004, Saturday Talks resumed.");
        assert_eq!(chunks[0].country_codes, Some(CountryCodes::new("FR", "DE")));
        assert!(chunks[0].published_date.is_some());
    }

    #[test]
    fn test_missing_header_metadata_is_absent() {
        let chunker = Chunker::default();
        let content = "preamble\n===\nSearch: casualties\n===\nNo date here\nSVM score: 0.5\nBody text.\n";
        let chunks = chunker.chunk("2005.txt", content);

        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].country_codes.is_none());
        assert!(chunks[0].published_date.is_none());
    }

    #[test]
    fn test_tagged_without_delimiters_yields_nothing() {
        let chunker = Chunker::default();
        let chunks = chunker.chunk("2006.txt", "just one blob of text with no structure");
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_trailing_header_without_body_is_skipped() {
        let chunker = Chunker::default();
        let content = "preamble\n===\nSearch: US-IQ\n===\nBody.\n===\nSearch: GB-IQ\n";
        let chunks = chunker.chunk("2007.txt", content);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Body.");
    }

    #[test]
    fn test_general_sections() {
        let chunker = Chunker::default();
        let content = "First document.\n____\nSecond document.\n____\n\n____\nThird.";
        let chunks = chunker.chunk("dump.txt", content);

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(texts, vec!["First document.", "Second document.", "Third."]);
    }

    #[test]
    fn test_general_without_delimiters_is_one_section() {
        let chunker = Chunker::default();
        let chunks = chunker.chunk("dump.txt", "A single short report.");
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_long_article_splits_share_metadata() {
        let chunker = Chunker::new(ChunkerConfig {
            chunk_size: 100,
            chunk_overlap: 20,
            ..ChunkerConfig::default()
        });
        let body = "Fighting continued in the north. ".repeat(20);
        let content = format!(
            "preamble\n===\nSearch: US-AF\n===\nKabul Times\nJune 3, 2008, Tuesday\nSVM score: 0.9\n{}\n",
            body
        );
        let chunks = chunker.chunk("2008.txt", &content);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert_eq!(chunk.country_codes, chunks[0].country_codes);
            assert_eq!(chunk.published_date, chunks[0].published_date);
            assert!(chunk.char_len() <= 100);
        }
    }
}
