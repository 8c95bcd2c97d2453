//! Static candidate source used when no vector store is configured or reachable.

use tracing::debug;

use crate::application::services::CandidateSource;
use crate::domain::{Candidate, DocumentDomain, DomainError, QueryEmbedding};

/// Hand-curated records with pre-assigned scores.
///
/// The query vector and `top_k` are ignored: the whole corpus is returned in
/// authored order so re-ranking and aggregation see the same input every time.
pub struct FallbackCorpus {
    label: String,
    records: Vec<Candidate>,
}

impl FallbackCorpus {
    pub fn new(label: impl Into<String>, records: Vec<Candidate>) -> Self {
        Self {
            label: label.into(),
            records,
        }
    }

    pub fn for_domain<D: DocumentDomain + ?Sized>(domain: &D) -> Self {
        Self::new(
            format!("fallback:{}", domain.name()),
            domain.fallback_corpus(),
        )
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl CandidateSource for FallbackCorpus {
    fn label(&self) -> &str {
        &self.label
    }

    fn search(
        &self,
        _embedding: &QueryEmbedding,
        _top_k: usize,
    ) -> Result<Vec<Candidate>, DomainError> {
        debug!(
            target: "jurisearch::store",
            source = %self.label,
            count = self.records.len(),
            "serving fallback corpus"
        );
        Ok(self.records.clone())
    }
}
