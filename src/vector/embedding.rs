//! Chunk embedding with the MiniLM encoder.
//!
//! The model and tokenizer are loaded once into an [`Embedder`] and passed
//! where they are needed, never initialized as module-level statics.

use anyhow::Result;
use candle_core::{Device, Tensor};
use candle_transformers::models::bert::BertModel;
use tokenizers::Tokenizer;
use tracing::debug;

use super::config::MiniLmConfig;
use super::TARGET_VECTOR;
use crate::document::Document;

/// Anything that can turn a chunk of text into a fixed-length vector. Seam
/// for driving the embed stage with a stub in tests.
pub trait ChunkEncoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>>;
}

/// MiniLM sentence encoder holding the loaded model and its tokenizer.
pub struct Embedder {
    model: BertModel,
    tokenizer: Tokenizer,
    dimensions: usize,
    max_length: usize,
    device: Device,
}

impl Embedder {
    /// Download the model files if absent, then load the encoder and
    /// tokenizer into memory.
    pub async fn load(config: &MiniLmConfig) -> Result<Self> {
        config.ensure_models_exist().await?;

        Ok(Self {
            model: config.load_model()?,
            tokenizer: config.load_tokenizer()?,
            dimensions: config.dimensions,
            max_length: config.max_length,
            device: config.device.clone(),
        })
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }
}

impl ChunkEncoder for Embedder {
    /// Tokenize the chunk with truncation to the model's maximum input
    /// length, run it through the encoder, and take the first-token (CLS)
    /// pooled representation.
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

        let input_ids: Vec<u32> = encoding.get_ids().iter().take(self.max_length).copied().collect();
        let attention_mask: Vec<u32> = encoding
            .get_attention_mask()
            .iter()
            .take(self.max_length)
            .copied()
            .collect();

        let input_ids = Tensor::new(input_ids, &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(attention_mask, &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;

        let hidden_state = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        // CLS pooling: the first token's hidden state stands in for the
        // whole chunk.
        let cls = hidden_state.narrow(1, 0, 1)?.squeeze(1)?.squeeze(0)?;
        let vector = cls.to_vec1::<f32>()?;

        if vector.len() != self.dimensions {
            anyhow::bail!(
                "Unexpected embedding dimensions: got {}, expected {}",
                vector.len(),
                self.dimensions
            );
        }

        Ok(vector)
    }
}

/// Embed every chunk of the document, appending one vector per chunk in
/// chunk order. After this stage `embeddings` is index-aligned with
/// `chunks`.
pub fn embed_document(document: &mut Document, encoder: &impl ChunkEncoder) -> Result<()> {
    for chunk in &document.chunks {
        document.embeddings.push(encoder.encode(chunk)?);
    }

    if document.embeddings.len() != document.chunks.len() {
        anyhow::bail!(
            "Document {} has {} chunks but {} embeddings",
            document.id,
            document.chunks.len(),
            document.embeddings.len()
        );
    }

    debug!(target: TARGET_VECTOR, "Embedded {} chunks for document {}",
           document.chunks.len(), document.id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentMetadata;

    /// Encodes each chunk as a vector seeded by its byte length, so tests
    /// can tell which chunk produced which embedding.
    struct StubEncoder {
        dimensions: usize,
    }

    impl ChunkEncoder for StubEncoder {
        fn encode(&self, text: &str) -> Result<Vec<f32>> {
            Ok(vec![text.len() as f32; self.dimensions])
        }
    }

    fn document(chunks: Vec<&str>) -> Document {
        Document {
            id: "doc".to_string(),
            text: Vec::new(),
            metadata: DocumentMetadata {
                date: "2024-01-05T00:00:00+00:00".to_string(),
                headline: "h".to_string(),
                summary: "s".to_string(),
            },
            chunks: chunks.into_iter().map(str::to_string).collect(),
            embeddings: Vec::new(),
        }
    }

    #[test]
    fn embeddings_align_with_chunks() {
        let encoder = StubEncoder { dimensions: 384 };
        let mut document = document(vec!["one", "seven77", "xx"]);

        embed_document(&mut document, &encoder).unwrap();

        assert_eq!(document.embeddings.len(), document.chunks.len());
        // Each embedding is produced only from its own chunk.
        for (chunk, embedding) in document.chunks.iter().zip(&document.embeddings) {
            assert_eq!(embedding.len(), 384);
            assert!(embedding.iter().all(|&v| v == chunk.len() as f32));
        }
    }

    #[test]
    fn no_chunks_means_no_embeddings() {
        let encoder = StubEncoder { dimensions: 384 };
        let mut document = document(vec![]);

        embed_document(&mut document, &encoder).unwrap();

        assert!(document.embeddings.is_empty());
    }
}
