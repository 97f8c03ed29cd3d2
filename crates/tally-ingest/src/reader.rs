//! Reading archive files from disk

use crate::error::IngestError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Full text of one archive file plus its file name
///
/// Read once per pipeline run and discarded after chunking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    /// File name (no directory), used for era dispatch and as the index key
    pub filename: String,
    /// Decoded text with `\n` line endings
    pub content: String,
}

/// Decode ISO-8859-1 bytes and normalise line endings to `\n`
///
/// Every byte maps to the code point of the same value, so decoding never
/// fails.
///
/// # Examples
///
/// ```
/// use tally_ingest::decode_latin1;
///
/// assert_eq!(decode_latin1(b"caf\xe9\r\nbar"), "café\nbar");
/// ```
pub fn decode_latin1(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    let mut iter = bytes.iter().peekable();

    while let Some(&byte) = iter.next() {
        if byte == b'\r' {
            if iter.peek() == Some(&&b'\n') {
                iter.next();
            }
            text.push('\n');
        } else {
            text.push(char::from(byte));
        }
    }

    text
}

/// Read one archive file
pub fn read_document(path: &Path) -> Result<RawDocument, IngestError> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    debug!("Read {} ({} bytes)", path.display(), bytes.len());

    Ok(RawDocument {
        filename,
        content: decode_latin1(&bytes),
    })
}

/// List every regular file under `root`, recursively, in path order
pub fn discover_documents(root: &Path) -> Result<Vec<PathBuf>, IngestError> {
    if !root.is_dir() {
        return Err(IngestError::Walk {
            path: root.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| IngestError::Walk {
            path: root.to_path_buf(),
            message: e.to_string(),
        })?;

        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    if files.is_empty() {
        warn!("No files found under {}", root.display());
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_decode_high_bytes() {
        let text = decode_latin1(&[0x4d, 0xfc, 0x6e, 0x63, 0x68, 0x65, 0x6e]);
        assert_eq!(text, "München");
    }

    #[test]
    fn test_decode_lone_carriage_return() {
        assert_eq!(decode_latin1(b"a\rb\r\n\rc"), "a\nb\n\nc");
    }

    #[test]
    fn test_read_document_uses_file_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("2003.txt");
        fs::write(&path, b"line one\r\nline two").unwrap();

        let doc = read_document(&path).unwrap();
        assert_eq!(doc.filename, "2003.txt");
        assert_eq!(doc.content, "line one\nline two");
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = read_document(&dir.path().join("missing.txt"));
        assert!(matches!(result, Err(IngestError::Io { .. })));
    }

    #[test]
    fn test_discover_is_recursive_and_sorted() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("nested").join("c.txt"), "c").unwrap();

        let files = discover_documents(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_discover_missing_root() {
        let dir = TempDir::new().unwrap();
        let result = discover_documents(&dir.path().join("absent"));
        assert!(matches!(result, Err(IngestError::Walk { .. })));
    }
}
