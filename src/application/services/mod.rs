//! Service layer: the retrieval pipeline and the stages it is composed of.

mod embedding_provider;
pub mod ranking;
mod retrieval_service;
pub mod validator;

pub use embedding_provider::EmbeddingProvider;
pub use retrieval_service::{CandidateSource, EmbeddingEngine, RetrievalService};
pub use validator::{validate_query, validate_query_bounded};
