//! Upserting document chunks into the Qdrant collection.

use anyhow::{Context, Result};
use qdrant_client::qdrant::{
    vectors_config::Config, CreateCollection, Distance, PointStruct, UpsertPoints, VectorParams,
    VectorsConfig,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::TARGET_VECTOR;
use crate::document::Document;

/// Deterministic point id for a chunk: the first half of the SHA-256 digest
/// of the chunk text, rendered as a UUID. The same chunk text always maps to
/// the same point, so re-upserting overwrites instead of duplicating.
pub fn chunk_point_id(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(bytes).to_string()
}

/// One point per chunk: id from the chunk text, vector from the aligned
/// embedding, payload carrying the document metadata plus the chunk itself.
pub fn build_points(document: &Document) -> Result<Vec<PointStruct>> {
    if document.embeddings.len() != document.chunks.len() {
        anyhow::bail!(
            "Document {} has {} chunks but {} embeddings",
            document.id,
            document.chunks.len(),
            document.embeddings.len()
        );
    }

    document
        .chunks
        .iter()
        .zip(&document.embeddings)
        .map(|(chunk, embedding)| {
            let payload: Payload = json!({
                "date": document.metadata.date,
                "headline": document.metadata.headline,
                "summary": document.metadata.summary,
                "text": chunk,
            })
            .try_into()
            .map_err(|e| anyhow::anyhow!("Failed to build payload: {}", e))?;

            Ok(PointStruct::new(
                chunk_point_id(chunk),
                embedding.clone(),
                payload,
            ))
        })
        .collect()
}

/// Handle on the target collection. Each worker connects its own handle;
/// handles are never shared across workers.
pub struct VectorStore {
    client: Qdrant,
    collection: String,
}

impl VectorStore {
    pub fn connect(url: &str, api_key: Option<&str>, collection: &str) -> Result<Self> {
        let mut builder = Qdrant::from_url(url).timeout(Duration::from_secs(60));
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }
        let client = builder
            .build()
            .with_context(|| format!("Failed to connect to vector store at {}", url))?;

        Ok(Self {
            client,
            collection: collection.to_string(),
        })
    }

    /// Look the collection up and create it with the given dimensionality
    /// and cosine distance when the lookup fails. A failed lookup is the
    /// expected state on first run, not an error.
    pub async fn ensure_collection(&self, dims: u64) -> Result<()> {
        match self.client.collection_info(self.collection.as_str()).await {
            Ok(_) => {
                debug!(target: TARGET_VECTOR, "Retrieved an existing collection: {}", self.collection);
            }
            Err(_) => {
                self.client
                    .create_collection(CreateCollection {
                        collection_name: self.collection.clone(),
                        vectors_config: Some(VectorsConfig {
                            config: Some(Config::Params(VectorParams {
                                size: dims,
                                distance: Distance::Cosine.into(),
                                ..Default::default()
                            })),
                        }),
                        ..Default::default()
                    })
                    .await
                    .with_context(|| format!("Failed to create collection {}", self.collection))?;
                debug!(target: TARGET_VECTOR, "Created collection: {}", self.collection);
            }
        }

        Ok(())
    }

    /// Upsert all of the document's points in a single batched call.
    pub async fn push_document(&self, document: &Document) -> Result<()> {
        let points = build_points(document)?;
        if points.is_empty() {
            debug!(target: TARGET_VECTOR, "Document {} has no chunks to push", document.id);
            return Ok(());
        }
        let count = points.len();

        self.client
            .upsert_points(UpsertPoints {
                collection_name: self.collection.clone(),
                points,
                wait: Some(true),
                ..Default::default()
            })
            .await
            .with_context(|| format!("Failed to upsert points for document {}", document.id))?;

        info!(target: TARGET_VECTOR, "Upserted {} points for document {}", count, document.id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentMetadata;
    use qdrant_client::qdrant::value::Kind;

    fn document(chunks: Vec<&str>) -> Document {
        let embeddings = chunks.iter().map(|_| vec![0.1_f32; 4]).collect();
        Document {
            id: "doc".to_string(),
            text: Vec::new(),
            metadata: DocumentMetadata {
                date: "2024-01-05T00:00:00+00:00".to_string(),
                headline: "A&B News".to_string(),
                summary: "S".to_string(),
            },
            chunks: chunks.into_iter().map(str::to_string).collect(),
            embeddings,
        }
    }

    fn payload_str<'a>(point: &'a PointStruct, key: &str) -> &'a str {
        match &point.payload[key].kind {
            Some(Kind::StringValue(s)) => s,
            other => panic!("payload {} is not a string: {:?}", key, other),
        }
    }

    #[test]
    fn point_ids_are_deterministic() {
        assert_eq!(chunk_point_id("same chunk"), chunk_point_id("same chunk"));
        assert_ne!(chunk_point_id("one chunk"), chunk_point_id("another"));
    }

    #[test]
    fn builds_one_point_per_chunk() {
        let document = document(vec!["first chunk", "second chunk"]);

        let points = build_points(&document).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(payload_str(&points[0], "text"), "first chunk");
        assert_eq!(payload_str(&points[0], "headline"), "A&B News");
        assert_eq!(payload_str(&points[1], "text"), "second chunk");
    }

    #[test]
    fn same_chunk_text_maps_to_same_point() {
        let a = build_points(&document(vec!["shared chunk"])).unwrap();
        let b = build_points(&document(vec!["shared chunk"])).unwrap();

        // Re-upserting the same chunk hits the same point id.
        assert_eq!(a[0].id, b[0].id);
    }

    #[test]
    fn misaligned_embeddings_are_an_error() {
        let mut document = document(vec!["first", "second"]);
        document.embeddings.pop();

        assert!(build_points(&document).is_err());
    }
}
