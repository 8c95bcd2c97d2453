//! Infrastructure layer wiring concrete adapters (embeddings, vector store, fallback corpus).

pub mod embeddings;
pub mod fallback;
pub mod http_client;

pub use embeddings::{GeminiEmbedEngine, RandomEmbedEngine};
pub use fallback::FallbackCorpus;
pub use http_client::{describe_http_error, QdrantVectorStore};
