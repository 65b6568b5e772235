use serde::{Deserialize, Serialize};

/// Metadata carried alongside every chunk pushed to the vector store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub date: String,
    pub headline: String,
    pub summary: String,
}

/// A news article as it moves through the parse -> chunk -> embed -> store
/// pipeline.
///
/// `id` is a content hash of the original raw content. `text` holds the three
/// cleaned fields in order: headline, summary, content. After the embed stage
/// `embeddings` is index-aligned with `chunks`: chunk `i`'s vector is
/// `embeddings[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: Vec<String>,
    pub metadata: DocumentMetadata,
    pub chunks: Vec<String>,
    pub embeddings: Vec<Vec<f32>>,
}
