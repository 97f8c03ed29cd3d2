//! Extract command implementation.

use super::pipeline_from_config;
use crate::backends::build_llm;
use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use crate::pipeline::{BatchReport, Pipeline};
use std::path::Path;
use tally_extractor::{CsvSink, ExtractionClient};

/// Execute the extract command.
pub async fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let data_dir = args.data_dir.unwrap_or_else(|| config.paths.data_dir.clone());
    let report_file = args.output.unwrap_or_else(|| config.paths.report_file.clone());

    let pipeline = pipeline_from_config(config);
    let report = extract_with(&pipeline, config, &data_dir, &report_file).await?;

    println!("{}", formatter.format_report(&report)?);
    report.ensure_success()
}

/// Run the extract phase of `pipeline`, appending to `report_file`.
pub(crate) async fn extract_with(
    pipeline: &Pipeline,
    config: &Config,
    data_dir: &Path,
    report_file: &Path,
) -> Result<BatchReport> {
    let client = ExtractionClient::new(
        build_llm(&config.llm)?,
        pipeline.embedder(),
        config.extractor.clone(),
    );
    let mut sink = CsvSink::new(report_file);

    pipeline.extract_and_save(data_dir, &client, &mut sink).await
}
