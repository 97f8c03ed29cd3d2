//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use crate::pipeline::{BatchReport, FileStatus};
use colored::*;
use tally_domain::Chunk;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Characters of chunk text shown in a preview table cell
const PREVIEW_CHARS: usize = 60;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a phase report.
    pub fn format_report(&self, report: &BatchReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Table => Ok(self.format_report_table(report)),
            OutputFormat::Quiet => Ok(self.format_report_quiet(report)),
        }
    }

    fn format_report_table(&self, report: &BatchReport) -> String {
        if report.outcomes.is_empty() {
            return self.warning(&format!("No files found for {}.", report.stage));
        }

        let mut builder = Builder::default();
        builder.push_record(["File", "Status", "Detail"]);

        for outcome in &report.outcomes {
            let (status, detail) = match &outcome.status {
                FileStatus::Ok { detail } => (self.colorize("ok", "green"), detail.as_str()),
                FileStatus::Skipped { reason } => (self.colorize("skipped", "yellow"), reason.as_str()),
                FileStatus::Failed { error } => (self.colorize("failed", "red"), error.as_str()),
            };
            builder.push_record([outcome.file.display().to_string(), status, detail.to_string()]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let summary = format!(
            "{}: {} ok, {} skipped, {} failed",
            report.stage,
            report.succeeded(),
            report.skipped(),
            report.failed()
        );
        let summary = if report.is_success() {
            self.success(&summary)
        } else {
            self.error(&summary)
        };

        format!("{}\n{}", table, summary)
    }

    fn format_report_quiet(&self, report: &BatchReport) -> String {
        report
            .outcomes
            .iter()
            .map(|outcome| {
                let status = match outcome.status {
                    FileStatus::Ok { .. } => "ok",
                    FileStatus::Skipped { .. } => "skipped",
                    FileStatus::Failed { .. } => "failed",
                };
                format!("{}\t{}", status, outcome.file.display())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format a chunk preview for one file.
    pub fn format_chunks(&self, file: &str, chunks: &[Chunk], limit: Option<usize>) -> Result<String> {
        let shown = &chunks[..limit.unwrap_or(chunks.len()).min(chunks.len())];

        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = shown
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "content": c.content,
                            "country_codes": c.country_codes.as_ref().map(|cc| cc.to_string()),
                            "published_date": c.published_date.as_ref().map(|d| d.as_str()),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Quiet => Ok(chunks.len().to_string()),
            OutputFormat::Table => {
                if chunks.is_empty() {
                    return Ok(self.warning(&format!("{} produced no chunks.", file)));
                }

                let mut builder = Builder::default();
                builder.push_record(["#", "Countries", "Published", "Chars", "Text"]);
                for (i, chunk) in shown.iter().enumerate() {
                    builder.push_record([
                        i.to_string(),
                        chunk.country_codes.as_ref().map(|c| c.to_string()).unwrap_or_default(),
                        chunk.published_date.as_ref().map(|d| d.to_string()).unwrap_or_default(),
                        chunk.char_len().to_string(),
                        preview(&chunk.content),
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                let summary = self.info(&format!(
                    "{}: showing {} of {} chunks",
                    file,
                    shown.len(),
                    chunks.len()
                ));
                Ok(format!("{}\n{}", table, summary))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Single-line, truncated rendering of chunk text
fn preview(text: &str) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();

    if flat.chars().count() <= PREVIEW_CHARS {
        flat
    } else {
        let mut cut: String = flat.chars().take(PREVIEW_CHARS).collect();
        cut.push('…');
        cut
    }
}
