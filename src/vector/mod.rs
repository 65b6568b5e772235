// Vector embedding and storage configuration
pub const TARGET_VECTOR: &str = "news-embeddings";
pub const QDRANT_URL_ENV: &str = "QDRANT_API_URL";
pub const QDRANT_API_KEY_ENV: &str = "QDRANT_API_KEY";
pub const COLLECTION_NAME: &str = "alpaca_news";
pub const VECTOR_SIZE: u64 = 384;
pub const MODEL_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/model.safetensors";
pub const TOKENIZER_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/tokenizer.json";

pub mod config;
pub mod embedding;
pub mod storage;

// Re-export main components
pub use config::*;
pub use embedding::*;
pub use storage::*;
