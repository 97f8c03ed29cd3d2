//! Tally CLI - extract military casualty figures from news archives.

use clap::Parser;
use tally_cli::cli::RunArgs;
use tally_cli::commands;
use tally_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Log to stderr so report output on stdout stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> tally_cli::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let format = cli.format.map(Into::into).unwrap_or(config.output.format);
    let color_enabled = !cli.no_color && config.output.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => commands::execute_run(args, &config, &formatter).await,
        Command::Index(args) => commands::execute_index(args, &config, &formatter).await,
        Command::Extract(args) => commands::execute_extract(args, &config, &formatter).await,
        Command::Chunk(args) => commands::execute_chunk(args, &config, &formatter),
    }
}
