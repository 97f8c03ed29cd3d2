//! Command implementations.

pub mod chunk;
pub mod extract;
pub mod index;
pub mod run;

pub use self::chunk::execute_chunk;
pub use self::extract::execute_extract;
pub use self::index::execute_index;
pub use self::run::execute_run;

use crate::backends::build_embedder;
use crate::config::Config;
use crate::pipeline::Pipeline;
use tally_ingest::Chunker;
use tally_store::IndexStore;

/// Pipeline wired from configuration.
pub(crate) fn pipeline_from_config(config: &Config) -> Pipeline {
    let store = IndexStore::new(&config.paths.vector_store_dir)
        .with_batch_size(config.embedding.batch_size);

    Pipeline::new(
        Chunker::new(config.chunker.clone()),
        store,
        build_embedder(&config.embedding),
    )
}
