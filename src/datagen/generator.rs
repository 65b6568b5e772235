use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use super::types::TrainingExample;
use crate::llm::generate_llm_response;
use crate::prompts::suggestion_prompt;
use crate::{LLMParams, TARGET_LLM_REQUEST};

pub fn examples_file_path(dir: &Path) -> PathBuf {
    dir.join("examples.json")
}

pub fn training_data_file_path(dir: &Path) -> PathBuf {
    dir.join("training_data.json")
}

/// Load the input examples. A missing file is an error the calling binary
/// treats as fatal.
pub fn load_examples(dir: &Path) -> Result<Vec<TrainingExample>> {
    let path = examples_file_path(dir);
    if !path.is_file() {
        error!("Examples file {} not found", path.display());
        anyhow::bail!("Examples file {} not found", path.display());
    }

    let json = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let examples: Vec<TrainingExample> = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    info!("Loaded {} examples from {}", examples.len(), path.display());

    Ok(examples)
}

/// Generate an answer for every example in order. An example the LLM fails
/// on keeps an empty answer and is carried through rather than dropped.
pub async fn generate_training_data(
    examples: Vec<TrainingExample>,
    params: &LLMParams,
) -> Vec<TrainingExample> {
    let total = examples.len();
    info!(target: TARGET_LLM_REQUEST, "Generating responses for {} examples", total);

    let mut data = Vec::with_capacity(total);
    for (i, mut example) in examples.into_iter().enumerate() {
        let prompt = suggestion_prompt(&example.about_me, &example.context);
        match generate_llm_response(&prompt, params).await {
            Some(answer) => example.answer = Some(answer),
            None => {
                warn!(target: TARGET_LLM_REQUEST, "No answer generated for example {}/{}", i + 1, total);
            }
        }
        data.push(example);
    }

    data
}

/// Write the generated training data next to the input examples. Returns the
/// path written.
pub fn save_training_data(examples: &[TrainingExample], dir: &Path) -> Result<PathBuf> {
    let path = training_data_file_path(dir);

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
    let json = serde_json::to_string_pretty(examples)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Saved {} examples to {}", examples.len(), path.display());

    Ok(path)
}
