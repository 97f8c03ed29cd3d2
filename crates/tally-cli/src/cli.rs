//! CLI command definitions and argument parsing.

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tally - extract military casualty figures from news archives.
#[derive(Debug, Parser)]
#[command(name = "tally")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (defaults to ./tally.toml when present)
    #[arg(short, long, global = true, env = "TALLY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (one line per file)
    Quiet,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => OutputFormat::Table,
            CliFormat::Json => OutputFormat::Json,
            CliFormat::Quiet => OutputFormat::Quiet,
        }
    }
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build indexes, then extract facts into the report (default)
    Run(RunArgs),

    /// Chunk, embed and persist an index for every input file
    Index(IndexArgs),

    /// Query every index and append extracted facts to the report
    Extract(ExtractArgs),

    /// Preview how one file is chunked (no embedding or LLM calls)
    Chunk(ChunkArgs),
}

/// Arguments for the run command.
#[derive(Debug, Default, Parser)]
pub struct RunArgs {
    /// Input directory (overrides paths.data_dir)
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Report file (overrides paths.report_file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep existing indexes instead of rebuilding them
    #[arg(long)]
    pub skip_existing: bool,
}

/// Arguments for the index command.
#[derive(Debug, Parser)]
pub struct IndexArgs {
    /// Input directory (overrides paths.data_dir)
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Keep existing indexes instead of rebuilding them
    #[arg(long)]
    pub skip_existing: bool,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Input directory (overrides paths.data_dir)
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Report file (overrides paths.report_file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the chunk command.
#[derive(Debug, Parser)]
pub struct ChunkArgs {
    /// Archive file to chunk
    pub file: PathBuf,

    /// Show at most this many chunks
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["tally"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.no_color);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tally", "index", "--skip-existing", "--format", "json", "--no-color"])
            .unwrap();

        assert!(cli.no_color);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        match cli.command {
            Some(Command::Index(args)) => assert!(args.skip_existing),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_extract_output_override() {
        let cli = Cli::try_parse_from(["tally", "extract", "-o", "out.csv", "-d", "archive"]).unwrap();
        match cli.command {
            Some(Command::Extract(args)) => {
                assert_eq!(args.output, Some(PathBuf::from("out.csv")));
                assert_eq!(args.data_dir, Some(PathBuf::from("archive")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_chunk_requires_file() {
        assert!(Cli::try_parse_from(["tally", "chunk"]).is_err());

        let cli = Cli::try_parse_from(["tally", "chunk", "data/2003.txt", "--limit", "5"]).unwrap();
        match cli.command {
            Some(Command::Chunk(args)) => {
                assert_eq!(args.file, PathBuf::from("data/2003.txt"));
                assert_eq!(args.limit, Some(5));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["tally", "--format", "xml"]).is_err());
    }
}
