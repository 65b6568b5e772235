//! Token-window chunking of cleaned document text.

use anyhow::Result;
use tokenizers::Tokenizer;
use tracing::debug;

use super::types::Document;
use crate::TARGET_PIPELINE;

/// Maximum number of tokens per chunk, tied to the embedding model's input
/// limit.
pub const MAX_CHUNK_TOKENS: usize = 384;

/// Split token offsets into windows of at most `max_tokens` tokens and
/// return the corresponding byte spans into the original text.
fn window_spans(offsets: &[(usize, usize)], max_tokens: usize) -> Vec<(usize, usize)> {
    assert!(max_tokens > 0, "max_tokens must be positive");

    let mut spans = Vec::new();
    let mut start = 0;
    while start < offsets.len() {
        let end = usize::min(start + max_tokens, offsets.len());
        let byte_start = offsets[start].0;
        let byte_end = offsets[end - 1].1;
        if byte_end > byte_start {
            spans.push((byte_start, byte_end));
        }
        start = end;
    }
    spans
}

/// Split a text field into chunks of at most `max_tokens` tokens, with
/// boundaries falling on token boundaries. Empty or whitespace-only text
/// produces no chunks.
pub fn chunk_by_token_window(
    text: &str,
    tokenizer: &Tokenizer,
    max_tokens: usize,
) -> Result<Vec<String>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let encoding = tokenizer
        .encode(text, false)
        .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

    // Offsets of real tokens only; special tokens carry no text span.
    let offsets: Vec<(usize, usize)> = encoding
        .get_offsets()
        .iter()
        .zip(encoding.get_special_tokens_mask())
        .filter(|(_, &special)| special == 0)
        .map(|(&span, _)| span)
        .collect();

    Ok(window_spans(&offsets, max_tokens)
        .into_iter()
        .map(|(start, end)| text[start..end].trim().to_string())
        .filter(|chunk| !chunk.is_empty())
        .collect())
}

/// Split every text field of the document into model-sized chunks, appended
/// to `document.chunks` in field order. Embeddings are left untouched.
pub fn chunk_document(
    document: &mut Document,
    tokenizer: &Tokenizer,
    max_tokens: usize,
) -> Result<()> {
    let mut chunks = Vec::new();
    for text in &document.text {
        chunks.extend(chunk_by_token_window(text, tokenizer, max_tokens)?);
    }

    debug!(target: TARGET_PIPELINE, "Document {} split into {} chunks", document.id, chunks.len());
    document.chunks = chunks;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::types::DocumentMetadata;
    use tokenizers::models::wordlevel::WordLevel;
    use tokenizers::pre_tokenizers::whitespace::Whitespace;

    /// Whitespace word-level tokenizer; every word maps to the unknown token
    /// but offsets are exact, which is all the chunker needs.
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

    fn document(text: Vec<&str>) -> Document {
        Document {
            id: "doc".to_string(),
            text: text.into_iter().map(str::to_string).collect(),
            metadata: DocumentMetadata {
                date: "2024-01-05T00:00:00+00:00".to_string(),
                headline: "h".to_string(),
                summary: "s".to_string(),
            },
            chunks: Vec::new(),
            embeddings: Vec::new(),
        }
    }

    #[test]
    fn windows_never_exceed_max_tokens() {
        let offsets: Vec<(usize, usize)> = (0..7).map(|i| (i * 2, i * 2 + 1)).collect();
        let spans = window_spans(&offsets, 3);
        assert_eq!(spans, vec![(0, 5), (6, 11), (12, 13)]);
    }

    #[test]
    fn splits_text_on_token_boundaries() {
        let tokenizer = test_tokenizer();
        let chunks = chunk_by_token_window("one two three four five", &tokenizer, 2).unwrap();
        assert_eq!(chunks, vec!["one two", "three four", "five"]);
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let tokenizer = test_tokenizer();
        let chunks = chunk_by_token_window("short headline", &tokenizer, 384).unwrap();
        assert_eq!(chunks, vec!["short headline"]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let tokenizer = test_tokenizer();
        assert!(chunk_by_token_window("", &tokenizer, 384).unwrap().is_empty());
        assert!(chunk_by_token_window("   ", &tokenizer, 384)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn chunks_concatenate_in_field_order() {
        let tokenizer = test_tokenizer();
        let mut document = document(vec!["headline words", "", "content one two three"]);

        chunk_document(&mut document, &tokenizer, 2).unwrap();

        // Headline chunks first, no chunks for the empty summary, then content.
        assert_eq!(
            document.chunks,
            vec!["headline words", "content one", "two three"]
        );
        assert!(document.embeddings.is_empty());
    }
}
