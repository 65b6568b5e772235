//! Load a saved news batch and run it through the parse -> chunk -> embed ->
//! store pipeline.
//!
//! Requires `QDRANT_API_URL` in the environment; `QDRANT_API_KEY` is only
//! needed for authenticated deployments. The embedding model is downloaded
//! into `models/` on first use.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use marketwire::environment::require_env;
use marketwire::logging;
use marketwire::news::load_news;
use marketwire::pipeline::{run_pipeline, StoreConfig};
use marketwire::vector::{
    Embedder, MiniLmConfig, COLLECTION_NAME, QDRANT_API_KEY_ENV, QDRANT_URL_ENV, VECTOR_SIZE,
};

#[derive(Parser)]
#[clap(name = "embed-news", about = "Embed a saved news batch into the vector store")]
struct Cli {
    /// Start date in the format YYYY-MM-DD
    #[clap(long, default_value = "2024-01-01")]
    from_date: String,

    /// End date in the format YYYY-MM-DD
    #[clap(long, default_value = "2024-01-09")]
    to_date: String,

    /// Number of worker tasks processing articles in parallel
    #[clap(long, default_value = "1")]
    workers: usize,

    /// Directory raw news batches are read from
    #[clap(long, default_value = "data")]
    data_dir: PathBuf,

    /// Name of the target collection
    #[clap(long, default_value = COLLECTION_NAME)]
    collection: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::configure_logging();

    let cli = Cli::parse();

    let url = require_env(QDRANT_URL_ENV);
    let api_key = std::env::var(QDRANT_API_KEY_ENV)
        .ok()
        .filter(|key| !key.is_empty());

    let articles = load_news(&cli.data_dir, &cli.from_date, &cli.to_date)?;

    let config = MiniLmConfig::default();
    let embedder = Arc::new(Embedder::load(&config).await?);

    let store = StoreConfig {
        url,
        api_key,
        collection: cli.collection,
    };
    store.connect()?.ensure_collection(VECTOR_SIZE).await?;

    run_pipeline(articles, cli.workers, embedder, store).await?;

    Ok(())
}
