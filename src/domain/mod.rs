//! Domain layer: search queries, candidates, and the two document shapes.

pub mod documents;
pub mod errors;
pub mod models;

pub use documents::{ContractTemplates, DocumentDomain, Precedents};
pub use errors::{DomainError, ValidationError};
pub use models::{
    Candidate, ContractTemplate, Precedent, QueryEmbedding, RankedDocument, SearchQuery,
    SearchResult, StandardClause, ALL_CATEGORIES,
};
