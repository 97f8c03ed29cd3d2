//! Chunk command implementation.

use crate::cli::ChunkArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use tally_ingest::{read_document, Chunker};

/// Execute the chunk command.
pub fn execute_chunk(args: ChunkArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let document = read_document(&args.file)?;
    let chunker = Chunker::new(config.chunker.clone());
    let chunks = chunker.chunk_document(&document);

    println!(
        "{}",
        formatter.format_chunks(&document.filename, &chunks, args.limit)?
    );
    Ok(())
}
