//! Generate supervised training data by answering saved examples with an
//! LLM.
//!
//! ## Configuration
//!
//! - `DATAGEN_LLM_TYPE`: Type of LLM to use ("ollama" or "openai", default: "openai")
//! - `OLLAMA_HOST`: Ollama host name (default: "localhost")
//! - `OLLAMA_PORT`: Ollama port number (default: 11434)
//! - `OPENAI_API_KEY`: OpenAI API key (required if DATAGEN_LLM_TYPE is "openai")

use anyhow::Result;
use async_openai::{config::OpenAIConfig, Client as OpenAIClient};
use clap::builder::PossibleValuesParser;
use clap::Parser;
use ollama_rs::Ollama;
use std::env;
use std::path::PathBuf;
use tracing::info;

use marketwire::datagen::{
    generate_training_data, load_examples, save_training_data, ALLOWED_MODELS,
};
use marketwire::environment::{env_or, require_env};
use marketwire::logging;
use marketwire::{LLMClient, LLMParams};

#[derive(Parser)]
#[clap(name = "generate-training-data", about = "Generate training data with an LLM")]
struct Cli {
    /// Model used to answer the examples
    #[clap(long, default_value = "gpt-4o-mini", value_parser = PossibleValuesParser::new(ALLOWED_MODELS))]
    model: String,

    /// Sampling temperature
    #[clap(long, default_value = "0.7")]
    temperature: f32,

    /// Directory holding examples.json, where training_data.json is written
    #[clap(long, default_value = "data")]
    data_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::configure_logging();

    let cli = Cli::parse();

    // Configure LLM client
    let llm_client = match env_or("DATAGEN_LLM_TYPE", "openai").as_str() {
        "ollama" => {
            let host = env_or("OLLAMA_HOST", "localhost");
            let port: u16 = env::var("OLLAMA_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(11434);

            info!("Connecting to Ollama at {}:{}", host, port);
            LLMClient::Ollama(Ollama::new(host, port))
        }
        _ => {
            let api_key = require_env("OPENAI_API_KEY");
            let config = OpenAIConfig::new().with_api_key(api_key);
            LLMClient::OpenAI(OpenAIClient::with_config(config))
        }
    };

    let params = LLMParams {
        llm_client,
        model: cli.model.clone(),
        temperature: cli.temperature,
    };

    let examples = load_examples(&cli.data_dir)?;
    let data = generate_training_data(examples, &params).await;
    let path = save_training_data(&data, &cli.data_dir)?;

    info!("Training data written to {}", path.display());

    Ok(())
}
