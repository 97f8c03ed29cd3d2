//! Index command implementation.

use super::pipeline_from_config;
use crate::cli::IndexArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the index command.
pub async fn execute_index(args: IndexArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let data_dir = args.data_dir.unwrap_or_else(|| config.paths.data_dir.clone());
    std::fs::create_dir_all(&config.paths.results_dir)?;

    let pipeline = pipeline_from_config(config);
    let report = pipeline.build_indexes(&data_dir, args.skip_existing).await?;

    println!("{}", formatter.format_report(&report)?);
    report.ensure_success()
}
