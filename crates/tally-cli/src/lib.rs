//! Tally CLI library.
//!
//! Configuration loading, backend wiring, the two-phase pipeline and output
//! formatting behind the `tally` binary.

pub mod backends;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
pub use pipeline::{BatchReport, FileOutcome, FileStatus, Pipeline, Stage};
