use anyhow::Result;
use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{
    BertModel, Config as BertConfig, HiddenAct, PositionEmbeddingType,
};
use std::path::Path;
use tokenizers::Tokenizer;
use tokio::fs;
use tracing::{error, info};

use crate::vector::{MODEL_URL, TARGET_VECTOR, TOKENIZER_URL};

/// Configuration for the MiniLM sentence-embedding model.
pub struct MiniLmConfig {
    pub model_path: String,
    pub tokenizer_path: String,
    pub dimensions: usize,
    pub max_length: usize,
    pub device: Device,
}

impl Default for MiniLmConfig {
    fn default() -> Self {
        Self {
            model_path: "models/all-minilm-l6-v2.safetensors".to_string(),
            tokenizer_path: "models/minilm-tokenizer.json".to_string(),
            dimensions: 384,
            max_length: 512,
            device: Device::Cpu,
        }
    }
}

impl MiniLmConfig {
    /// all-MiniLM-L6-v2 geometry.
    fn bert_config(&self) -> BertConfig {
        BertConfig {
            hidden_size: self.dimensions,
            intermediate_size: 1536,
            max_position_embeddings: self.max_length,
            num_attention_heads: 12,
            num_hidden_layers: 6,
            vocab_size: 30522,
            layer_norm_eps: 1e-12,
            pad_token_id: 0,
            hidden_act: HiddenAct::Gelu,
            hidden_dropout_prob: 0.0,
            type_vocab_size: 2,
            initializer_range: 0.02,
            position_embedding_type: PositionEmbeddingType::Absolute,
            use_cache: false,
            classifier_dropout: None,
            model_type: None,
        }
    }

    pub async fn ensure_models_exist(&self) -> Result<()> {
        // Create models directory if it doesn't exist
        if !Path::new("models").exists() {
            fs::create_dir("models").await?;
        }

        // Check and download model file if needed
        if !Path::new(&self.model_path).exists() {
            info!(target: TARGET_VECTOR, "Downloading MiniLM model from {}", MODEL_URL);
            let response = reqwest::get(MODEL_URL).await?;
            let bytes = response.bytes().await?;
            fs::write(&self.model_path, bytes).await?;
            info!(target: TARGET_VECTOR, "Downloaded MiniLM model to {}", self.model_path);
        }

        // Check and download tokenizer file if needed
        if !Path::new(&self.tokenizer_path).exists() {
            info!(target: TARGET_VECTOR, "Downloading MiniLM tokenizer from {}", TOKENIZER_URL);
            let response = reqwest::get(TOKENIZER_URL).await?;
            let bytes = response.bytes().await?;
            fs::write(&self.tokenizer_path, bytes).await?;
            info!(target: TARGET_VECTOR, "Downloaded MiniLM tokenizer to {}", self.tokenizer_path);
        }

        Ok(())
    }

    /// Load the BERT encoder from the safetensors file.
    pub fn load_model(&self) -> Result<BertModel> {
        info!(target: TARGET_VECTOR, "Starting to load MiniLM model from {}", self.model_path);

        let tensors = match candle_core::safetensors::load_buffer(
            &std::fs::read(&self.model_path)?,
            &self.device,
        ) {
            Ok(t) => t,
            Err(e) => {
                error!(target: TARGET_VECTOR, "!!! Failed to load model tensors: {}", e);
                return Err(anyhow::anyhow!("Failed to load model tensors"));
            }
        };

        let vb = VarBuilder::from_tensors(tensors, DType::F32, &self.device);

        let model = match BertModel::load(vb, &self.bert_config()) {
            Ok(m) => m,
            Err(e) => {
                error!(target: TARGET_VECTOR, "!!! Failed to load BERT model: {}", e);
                return Err(anyhow::anyhow!("Failed to load BERT model"));
            }
        };

        info!(target: TARGET_VECTOR, "Successfully loaded MiniLM model");
        Ok(model)
    }

    /// Load the tokenizer matching the encoder.
    pub fn load_tokenizer(&self) -> Result<Tokenizer> {
        info!(target: TARGET_VECTOR, "Starting to load MiniLM tokenizer from {}", self.tokenizer_path);

        let tokenizer = match Tokenizer::from_file(&self.tokenizer_path) {
            Ok(t) => t,
            Err(e) => {
                error!(target: TARGET_VECTOR, "!!! Failed to load tokenizer: {}", e);
                return Err(anyhow::anyhow!("Failed to load tokenizer"));
            }
        };

        info!(target: TARGET_VECTOR, "Successfully loaded MiniLM tokenizer");
        Ok(tokenizer)
    }
}
