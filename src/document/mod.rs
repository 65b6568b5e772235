//! Document ETL: cleaning, parsing and chunking of raw articles.

mod chunker;
mod parser;
mod types;

pub use self::chunker::{chunk_by_token_window, chunk_document, MAX_CHUNK_TOKENS};
pub use self::parser::{clean_content, clean_field, content_id, parse_article};
pub use self::types::{Document, DocumentMetadata};
