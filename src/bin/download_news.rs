//! Download financial news over a date range and save the raw batch to JSON.
//!
//! Requires `APCA_API_KEY_ID` and `APCA_API_SECRET_KEY` in the environment;
//! missing credentials terminate the process before any work happens.

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use marketwire::environment::require_env;
use marketwire::logging;
use marketwire::news::{download_historical_news, save_news_to_json, AlpacaNewsClient, DateRange};

#[derive(Parser)]
#[clap(name = "download-news", about = "Download financial news from the market-news API")]
struct Cli {
    /// Start date in the format YYYY-MM-DD
    #[clap(long, default_value = "2024-01-01")]
    from_date: NaiveDate,

    /// End date in the format YYYY-MM-DD
    #[clap(long, default_value = "2024-01-31")]
    to_date: NaiveDate,

    /// Directory raw news batches are written to
    #[clap(long, default_value = "data")]
    data_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::configure_logging();

    let cli = Cli::parse();

    let api_key_id = require_env("APCA_API_KEY_ID");
    let api_secret_key = require_env("APCA_API_SECRET_KEY");

    let client = AlpacaNewsClient::new(api_key_id, api_secret_key)?;
    let range = DateRange {
        from: cli.from_date,
        to: cli.to_date,
    };

    let articles = download_historical_news(&client, range).await?;
    let path = save_news_to_json(&articles, &cli.data_dir)?;

    info!("News data downloaded and saved at: {}", path.display());

    Ok(())
}
