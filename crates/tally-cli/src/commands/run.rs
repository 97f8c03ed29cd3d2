//! Run command implementation: index, then extract.

use super::extract::extract_with;
use super::pipeline_from_config;
use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use tracing::warn;

/// Execute the run command.
///
/// The extract phase runs even when some files failed to index; those files
/// then fail again in the extract report. The command fails if either phase
/// had a failure.
pub async fn execute_run(args: RunArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let data_dir = args.data_dir.unwrap_or_else(|| config.paths.data_dir.clone());
    let report_file = args.output.unwrap_or_else(|| config.paths.report_file.clone());
    std::fs::create_dir_all(&config.paths.results_dir)?;

    let pipeline = pipeline_from_config(config);

    let index_report = pipeline.build_indexes(&data_dir, args.skip_existing).await?;
    println!("{}", formatter.format_report(&index_report)?);
    if !index_report.is_success() {
        warn!("{} file(s) failed to index", index_report.failed());
    }

    let extract_report = extract_with(&pipeline, config, &data_dir, &report_file).await?;
    println!("{}", formatter.format_report(&extract_report)?);

    match (index_report.ensure_success(), extract_report.ensure_success()) {
        (Err(e), _) | (Ok(()), Err(e)) => Err(e),
        (Ok(()), Ok(())) => Ok(()),
    }
}
