//! Recursive size/overlap text splitter
//!
//! Text is cut on the coarsest separator present (blank line, newline, space,
//! then individual characters). Pieces still too large are split again with
//! the next separator; small pieces are merged back together up to the chunk
//! size, carrying up to `chunk_overlap` characters of trailing context into
//! the next chunk. Separators stay attached to the start of the piece that
//! follows them, so merged chunks reproduce the source text.
//!
//! Lengths are measured in characters, not bytes.

use std::collections::VecDeque;
use tracing::debug;

/// Separators tried in order, coarsest first. The empty separator splits
/// into single characters and always succeeds.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Splits text into bounded, overlapping chunks
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// Create a new splitter
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Maximum chunk length in characters
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Overlap carried between neighbouring chunks
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split the given text
    ///
    /// Chunks are trimmed; whitespace-only chunks are dropped, so blank input
    /// yields no chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let mut separator = separators.last().copied().unwrap_or("");
        let mut finer: &[&str] = &[];

        for (idx, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = candidate;
                break;
            }
            if text.contains(candidate) {
                separator = candidate;
                finer = &separators[idx + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut small: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                small.push(piece);
                continue;
            }

            if !small.is_empty() {
                chunks.extend(self.merge(&small));
                small.clear();
            }

            if finer.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
            } else {
                chunks.extend(self.split_with(piece, finer));
            }
        }

        if !small.is_empty() {
            chunks.extend(self.merge(&small));
        }

        chunks
    }

    /// Combine pieces until they reach the size limit, keeping an overlap window
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !window.is_empty() {
                if total > self.chunk_size {
                    debug!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total, self.chunk_size
                    );
                }
                if let Some(chunk) = join(&window) {
                    chunks.push(chunk);
                }

                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match window.pop_front() {
                        Some((_, dropped)) => total -= dropped,
                        None => break,
                    }
                }
            }

            window.push_back((piece, len));
            total += len;
        }

        if let Some(chunk) = join(&window) {
            chunks.push(chunk);
        }

        chunks
    }
}

/// Split `text` on `separator`, attaching each separator to the piece after it.
/// Empty pieces are dropped.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(idx, c)| &text[idx..idx + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;

    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }

    pieces
}

fn join(window: &VecDeque<(&str, usize)>) -> Option<String> {
    let text: String = window.iter().map(|(piece, _)| *piece).collect();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_words(count: usize) -> String {
        (0..count)
            .map(|i| format!("w{:03}", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_no_splitting_needed_for_small_text() {
        let splitter = TextSplitter::new(100, 20);
        let chunks = splitter.split("Short text here.");
        assert_eq!(chunks, vec!["Short text here.".to_string()]);
    }

    #[test]
    fn test_unsplittable_pieces_are_trimmed() {
        let splitter = TextSplitter::new(1, 0);
        assert_eq!(splitter.split("ab cd"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_empty_and_blank_text() {
        let splitter = TextSplitter::new(100, 20);
        assert!(splitter.split("").is_empty());
        assert!(splitter.split("  \n\n \n").is_empty());
    }

    #[test]
    fn test_chunks_respect_size_limit() {
        let splitter = TextSplitter::new(50, 10);
        let text = numbered_words(200);
        let chunks = splitter.split(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50, "chunk too long: {:?}", chunk);
        }
    }

    #[test]
    fn test_neighbouring_chunks_overlap() {
        let splitter = TextSplitter::new(1000, 200);
        let text = numbered_words(400);
        let chunks = splitter.split(&text);

        assert!(chunks.len() >= 2);
        let first_word_of_second = chunks[1].split(' ').next().unwrap();
        assert!(chunks[0].contains(first_word_of_second));
        assert_ne!(chunks[0].split(' ').next(), Some(first_word_of_second));
    }

    #[test]
    fn test_overlap_never_exceeds_limit() {
        let splitter = TextSplitter::new(100, 20);
        let text = numbered_words(300);
        let chunks = splitter.split(&text);

        for pair in chunks.windows(2) {
            let prev_words: Vec<&str> = pair[0].split(' ').collect();
            let shared = pair[1]
                .split(' ')
                .take_while(|w| prev_words.contains(w))
                .map(|w| w.len() + 1)
                .sum::<usize>();
            assert!(shared <= 20 + 1);
        }
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let splitter = TextSplitter::new(30, 0);
        let text = "First paragraph here.\n\nSecond paragraph here.";
        let chunks = splitter.split(text);

        assert_eq!(chunks, vec![
            "First paragraph here.".to_string(),
            "Second paragraph here.".to_string(),
        ]);
    }

    #[test]
    fn test_very_long_word_is_split_by_characters() {
        let splitter = TextSplitter::new(20, 5);
        let text = "a".repeat(100);
        let chunks = splitter.split(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 20);
        }
    }

    #[test]
    fn test_multibyte_text_is_measured_in_characters() {
        let splitter = TextSplitter::new(10, 0);
        let text = "é".repeat(25);
        let chunks = splitter.split(&text);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 10);
    }

    #[test]
    fn test_split_keeping_separator_attaches_to_following_piece() {
        let pieces = split_keeping_separator("a\n\nb\n\nc", "\n\n");
        assert_eq!(pieces, vec!["a", "\n\nb", "\n\nc"]);

        let pieces = split_keeping_separator("\n\n\n\n", "\n\n");
        assert_eq!(pieces, vec!["\n\n", "\n\n"]);
    }

    #[test]
    fn test_deterministic() {
        let splitter = TextSplitter::new(64, 16);
        let text = numbered_words(150);
        assert_eq!(splitter.split(&text), splitter.split(&text));
    }
}
