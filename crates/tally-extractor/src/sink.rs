//! Append-only CSV casualty report

use crate::error::ExtractorError;
use csv::{Terminator, WriterBuilder};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tally_domain::{ExtractedFact, FactSink, REPORT_HEADER};
use tracing::debug;

/// Appends facts to a CSV file, writing the header only when creating it
///
/// The file is opened, appended and closed on every call, so a crash between
/// files leaves every earlier file's rows on disk.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    /// Create a sink for `path` (nothing is touched until the first append)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Report file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FactSink for CsvSink {
    type Error = ExtractorError;

    fn append(&mut self, facts: &[ExtractedFact]) -> Result<usize, Self::Error> {
        let is_new = !self.path.exists();
        if is_new {
            if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .terminator(Terminator::CRLF)
            .from_writer(file);

        if is_new {
            writer.write_record(REPORT_HEADER)?;
        }
        for fact in facts {
            writer.write_record(fact.as_record())?;
        }
        writer.flush()?;

        debug!("Appended {} rows to {}", facts.len(), self.path.display());
        Ok(facts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_first_append_writes_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results").join("military_casualties.csv");
        let mut sink = CsvSink::new(&path);

        let written = sink
            .append(&[ExtractedFact::new("2003-03-20", "3", "US, Iraq")])
            .unwrap();

        assert_eq!(written, 1);
        assert_eq!(
            read(&path),
            "Date,Death Count,Countries involved\r\n2003-03-20,3,\"US, Iraq\"\r\n"
        );
    }

    #[test]
    fn test_second_append_keeps_one_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.csv");
        let mut sink = CsvSink::new(&path);

        sink.append(&[ExtractedFact::new("2003-03-20", "3", "US, Iraq")]).unwrap();
        sink.append(&[
            ExtractedFact::new("2003-03-21", "approximately 10-15", "US, UK, Iraq"),
            ExtractedFact::new("2004-01-02", "1", "US"),
        ])
        .unwrap();

        let content = read(&path);
        assert_eq!(content.matches("Date,Death Count").count(), 1);
        assert_eq!(content.lines().count(), 4);
        assert!(content.contains("2003-03-20,3,\"US, Iraq\""));
        assert!(content.ends_with("2004-01-02,1,US\r\n"));
    }

    #[test]
    fn test_empty_append_on_new_file_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.csv");
        let mut sink = CsvSink::new(&path);

        assert_eq!(sink.append(&[]).unwrap(), 0);
        assert_eq!(read(&path), "Date,Death Count,Countries involved\r\n");
    }

    #[test]
    fn test_existing_file_gets_no_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.csv");
        std::fs::write(&path, "previous,row,kept\r\n").unwrap();

        CsvSink::new(&path)
            .append(&[ExtractedFact::new("d", "c", "n")])
            .unwrap();

        assert_eq!(read(&path), "previous,row,kept\r\nd,c,n\r\n");
    }
}
