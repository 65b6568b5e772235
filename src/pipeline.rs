//! Orchestration of the parse -> chunk -> embed -> store pipeline.
//!
//! Each document's run is independent and self-contained: a failed article
//! is logged and its siblings continue. In parallel mode every worker task
//! acquires its own store connection; connection handles are never shared
//! across workers.

use anyhow::Result;
use futures::future::join_all;
use std::sync::Arc;
use tokenizers::Tokenizer;
use tracing::{debug, error, info};

use crate::document::{chunk_document, parse_article, Document, MAX_CHUNK_TOKENS};
use crate::news::RawArticle;
use crate::vector::{embed_document, ChunkEncoder, Embedder, VectorStore};
use crate::TARGET_PIPELINE;

/// Connection settings from which each worker builds its own store handle.
#[derive(Clone)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
}

impl StoreConfig {
    pub fn connect(&self) -> Result<VectorStore> {
        VectorStore::connect(&self.url, self.api_key.as_deref(), &self.collection)
    }
}

/// Parse, chunk and embed one raw article into a store-ready document.
pub fn prepare_document(
    article: &RawArticle,
    tokenizer: &Tokenizer,
    encoder: &impl ChunkEncoder,
) -> Result<Document> {
    debug!(target: TARGET_PIPELINE, "Parsing a new article");
    let mut document = parse_article(article);

    debug!(target: TARGET_PIPELINE, "Chunking document {}", document.id);
    chunk_document(&mut document, tokenizer, MAX_CHUNK_TOKENS)?;

    debug!(target: TARGET_PIPELINE, "Embedding document {}", document.id);
    embed_document(&mut document, encoder)?;

    Ok(document)
}

/// Run one article through the full pipeline and upsert its points.
pub async fn process_article(
    article: &RawArticle,
    embedder: &Embedder,
    store: &VectorStore,
) -> Result<()> {
    let document = prepare_document(article, embedder.tokenizer(), embedder)?;
    store.push_document(&document).await
}

async fn process_batch(articles: Vec<RawArticle>, embedder: Arc<Embedder>, store: VectorStore) {
    for article in &articles {
        if let Err(e) = process_article(article, &embedder, &store).await {
            error!(target: TARGET_PIPELINE, "Failed to process article \"{}\": {:?}",
                   article.headline, e);
        }
    }
}

/// Process a batch of articles, sequentially when `workers <= 1` or fanned
/// out across worker tasks over disjoint slices of the batch. No ordering is
/// guaranteed across documents.
pub async fn run_pipeline(
    articles: Vec<RawArticle>,
    workers: usize,
    embedder: Arc<Embedder>,
    store: StoreConfig,
) -> Result<()> {
    let total = articles.len();
    info!(target: TARGET_PIPELINE, "Processing {} articles with {} workers", total, workers.max(1));

    if workers <= 1 {
        process_batch(articles, embedder, store.connect()?).await;
        info!(target: TARGET_PIPELINE, "Finished processing {} articles", total);
        return Ok(());
    }

    let slice_len = total.div_ceil(workers);
    let mut handles = Vec::new();
    let mut articles = articles;

    while !articles.is_empty() {
        let rest = articles.split_off(slice_len.min(articles.len()));
        let slice = std::mem::replace(&mut articles, rest);
        let embedder = Arc::clone(&embedder);
        let store = store.clone();

        handles.push(tokio::spawn(async move {
            // Per-worker store acquisition: each task owns its connection.
            match store.connect() {
                Ok(handle) => process_batch(slice, embedder, handle).await,
                Err(e) => {
                    error!(target: TARGET_PIPELINE, "Worker failed to connect to vector store: {:?}", e);
                }
            }
        }));
    }

    for result in join_all(handles).await {
        if let Err(e) = result {
            error!(target: TARGET_PIPELINE, "Worker task panicked: {:?}", e);
        }
    }

    info!(target: TARGET_PIPELINE, "Finished processing {} articles", total);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::build_points;
    use anyhow::Result;
    use chrono::{TimeZone, Utc};
    use qdrant_client::qdrant::value::Kind;
    use tokenizers::models::wordlevel::WordLevel;
    use tokenizers::pre_tokenizers::whitespace::Whitespace;

    struct StubEncoder;

    impl ChunkEncoder for StubEncoder {
        fn encode(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.5; 384])
        }
    }

    fn test_tokenizer() -> Tokenizer {
        let vocab = [("[UNK]".to_string(), 0u32)].into_iter().collect();
        let model = WordLevel::builder()
            .vocab(vocab)
            .unk_token("[UNK]".to_string())
            .build()
            .unwrap();
        let mut tokenizer = Tokenizer::new(model);
        tokenizer.with_pre_tokenizer(Some(Whitespace {}));
        tokenizer
    }

    #[test]
    fn raw_article_flows_through_to_points() {
        let article = RawArticle {
            headline: "A&B <b>News</b>".to_string(),
            summary: "S".to_string(),
            content: "Some <p>content</p>.".to_string(),
            date: Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
        };
        let tokenizer = test_tokenizer();

        let document = prepare_document(&article, &tokenizer, &StubEncoder).unwrap();

        // Cleaning stripped tags and entities from every field.
        assert_eq!(document.text[0], "A&B News");
        assert!(!document.text[0].contains('<'));
        assert!(!document.text[2].contains('<'));

        // Content yielded at least one chunk, each with a 384-dim vector.
        assert!(!document.chunks.is_empty());
        assert_eq!(document.embeddings.len(), document.chunks.len());
        assert!(document.embeddings.iter().all(|v| v.len() == 384));

        // One point per chunk, carrying the cleaned headline in its payload.
        let points = build_points(&document).unwrap();
        assert_eq!(points.len(), document.chunks.len());
        for point in &points {
            match &point.payload["headline"].kind {
                Some(Kind::StringValue(headline)) => assert_eq!(headline, "A&B News"),
                other => panic!("headline payload is not a string: {:?}", other),
            }
        }
    }

    #[test]
    fn tiny_window_splits_content_into_multiple_chunks() {
        let article = RawArticle {
            headline: String::new(),
            summary: String::new(),
            content: "one two three four five six".to_string(),
            date: Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
        };
        let tokenizer = test_tokenizer();

        let mut document = parse_article(&article);
        chunk_document(&mut document, &tokenizer, 2).unwrap();
        embed_document(&mut document, &StubEncoder).unwrap();

        assert_eq!(document.chunks.len(), 3);
        assert_eq!(document.embeddings.len(), 3);
    }
}
