//! Application layer wiring DTOs, formatting, and the retrieval services.

pub mod dtos;
pub mod format;
pub mod services;

pub use dtos::{
    template_query_from_contract, ContractReviewRequest, HealthStatusResponse, IntoRawQuery,
    PrecedentSearchRequest, TemplateSearchRequest,
};
pub use format::{format_precedents, format_templates};
pub use services::{CandidateSource, EmbeddingEngine, EmbeddingProvider, RetrievalService};
