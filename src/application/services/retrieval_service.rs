use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::{
    ranking::{aggregate, filter_by_category, rerank},
    validator::{validate_query_bounded, MAX_TOPIC_CHARS},
    EmbeddingProvider,
};
use crate::{
    application::dtos::HealthStatusResponse,
    domain::{Candidate, DocumentDomain, DomainError, QueryEmbedding, SearchQuery, SearchResult},
};

/// Abstraction over any embedding backend (remote HTTP model, synthetic vectors, etc).
pub trait EmbeddingEngine: Send + Sync {
    fn model(&self) -> &str;

    fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    fn dims(&self) -> Option<usize> {
        None
    }
}

/// Anything that can answer a nearest-neighbour query with scored candidates.
pub trait CandidateSource: Send + Sync {
    fn label(&self) -> &str;

    fn search(
        &self,
        embedding: &QueryEmbedding,
        top_k: usize,
    ) -> Result<Vec<Candidate>, DomainError>;

    fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

/// Retrieval pipeline for one document domain.
///
/// Validation, embedding, candidate lookup, mapping, re-ranking, category
/// filtering and aggregation run in sequence on every call. The live store is
/// attempted on each call and the fallback corpus answers whenever it is
/// missing or fails, so a store that recovers is picked up again without
/// rebuilding the service.
pub struct RetrievalService<D: DocumentDomain> {
    domain: D,
    embedder: EmbeddingProvider,
    store: Option<Arc<dyn CandidateSource>>,
    fallback: Arc<dyn CandidateSource>,
}

impl<D: DocumentDomain> RetrievalService<D> {
    pub fn new(domain: D, embedder: EmbeddingProvider, fallback: Arc<dyn CandidateSource>) -> Self {
        Self {
            domain,
            embedder,
            store: None,
            fallback,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn CandidateSource>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn domain(&self) -> &D {
        &self.domain
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// Validate a raw request and run the pipeline.
    ///
    /// Fails only with [`DomainError::Validation`] or [`DomainError::ToolCall`].
    pub fn search(
        &self,
        raw: &Map<String, Value>,
    ) -> Result<SearchResult<D::Document>, DomainError> {
        self.search_bounded(raw, MAX_TOPIC_CHARS)
    }

    /// [`search`](Self::search) accepting topics up to `max_topic_chars`.
    pub fn search_bounded(
        &self,
        raw: &Map<String, Value>,
        max_topic_chars: usize,
    ) -> Result<SearchResult<D::Document>, DomainError> {
        let started = Instant::now();
        let query = validate_query_bounded(&self.domain, raw, max_topic_chars)?;
        self.execute(&query, started)
    }

    /// Run the pipeline for an already validated query.
    pub fn search_query(
        &self,
        query: &SearchQuery,
    ) -> Result<SearchResult<D::Document>, DomainError> {
        self.execute(query, Instant::now())
    }

    fn execute(
        &self,
        query: &SearchQuery,
        started: Instant,
    ) -> Result<SearchResult<D::Document>, DomainError> {
        let result = self
            .run(query, started)
            .map_err(|err| err.into_tool_call(&query.topic))?;

        info!(
            target: "jurisearch::retrieval",
            domain = self.domain.name(),
            category = %query.category,
            returned = result.results.len(),
            total = result.total_found,
            elapsed_ms = result.execution_time_ms,
            "search completed"
        );
        Ok(result)
    }

    fn run(
        &self,
        query: &SearchQuery,
        started: Instant,
    ) -> Result<SearchResult<D::Document>, DomainError> {
        let embedding = self.embedder.embed(&query.topic)?;
        let candidates = self.candidates(&embedding, query.limit)?;

        let documents = candidates
            .into_iter()
            .map(|candidate| self.map_candidate(candidate))
            .collect::<Result<Vec<_>, _>>()?;

        let ranked = rerank(documents, query.relevance_threshold);
        let filtered = filter_by_category(ranked, &query.category, |category| {
            self.domain.is_passthrough(category)
        });

        Ok(aggregate(filtered, query.limit, &query.topic, started))
    }

    fn candidates(
        &self,
        embedding: &QueryEmbedding,
        top_k: usize,
    ) -> Result<Vec<Candidate>, DomainError> {
        match &self.store {
            Some(store) => match store.search(embedding, top_k) {
                Ok(candidates) => {
                    debug!(
                        target: "jurisearch::retrieval",
                        source = store.label(),
                        count = candidates.len(),
                        degraded_embedding = embedding.degraded,
                        "candidates retrieved"
                    );
                    return Ok(candidates);
                }
                Err(err) => {
                    warn!(
                        target: "jurisearch::retrieval",
                        source = store.label(),
                        domain = self.domain.name(),
                        error = %err,
                        "vector store failed; serving fallback corpus"
                    );
                }
            },
            None => {
                debug!(
                    target: "jurisearch::retrieval",
                    domain = self.domain.name(),
                    "no vector store configured; serving fallback corpus"
                );
            }
        }

        self.fallback.search(embedding, top_k)
    }

    fn map_candidate(&self, candidate: Candidate) -> Result<D::Document, DomainError> {
        if !candidate.score.is_finite() {
            return Err(DomainError::other(format!(
                "candidate score {} is not a finite number",
                candidate.score
            )));
        }
        Ok(self.domain.map_candidate(candidate))
    }

    /// Readiness report: the fallback corpus keeps the service usable even
    /// when the store is down, so a failing store degrades rather than fails.
    pub fn health(&self) -> HealthStatusResponse {
        let (ok, message) = match &self.store {
            None => (true, "fallback corpus (no vector store configured)".to_string()),
            Some(store) => match store.ping() {
                Ok(()) => (true, format!("ready ({})", store.label())),
                Err(err) => (false, format!("degraded: {err}")),
            },
        };

        HealthStatusResponse {
            ok,
            message,
            details: Some(format!(
                "domain: {}, embeddings: {}, dims: {}, checked_at: {}",
                self.domain.name(),
                if self.embedder.is_configured() {
                    "remote"
                } else {
                    "synthetic"
                },
                self.embedder.dimensions(),
                Utc::now()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::domain::{ContractTemplates, Precedents};

    struct Zeros;

    impl EmbeddingEngine for Zeros {
        fn model(&self) -> &str {
            "zeros"
        }

        fn embed(&self, _text: &str) -> Result<Vec<f32>, DomainError> {
            Ok(vec![0.0; 4])
        }
    }

    struct Corpus(Vec<Candidate>);

    impl CandidateSource for Corpus {
        fn label(&self) -> &str {
            "corpus"
        }

        fn search(&self, _: &QueryEmbedding, _: usize) -> Result<Vec<Candidate>, DomainError> {
            Ok(self.0.clone())
        }
    }

    /// Fails every other call, starting with the first.
    struct Flaky {
        calls: AtomicUsize,
        hits: Vec<Candidate>,
    }

    impl CandidateSource for Flaky {
        fn label(&self) -> &str {
            "flaky"
        }

        fn search(&self, _: &QueryEmbedding, _: usize) -> Result<Vec<Candidate>, DomainError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                Err(DomainError::storage("connection refused"))
            } else {
                Ok(self.hits.clone())
            }
        }

        fn ping(&self) -> Result<(), DomainError> {
            Err(DomainError::storage("connection refused"))
        }
    }

    fn service<D: DocumentDomain>(domain: D) -> RetrievalService<D> {
        let fallback = Arc::new(Corpus(domain.fallback_corpus()));
        RetrievalService::new(domain, EmbeddingProvider::offline(Arc::new(Zeros), 4), fallback)
    }

    fn raw(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn hit(score: f32, court: &str) -> Candidate {
        Candidate::new(score, raw(json!({ "title": "live", "court": court })))
    }

    #[test]
    fn validation_errors_surface_unwrapped() {
        let err = service(Precedents)
            .search(&raw(json!({ "court": "STF" })))
            .expect_err("topic is required");
        assert!(matches!(err, DomainError::Validation(ref v) if v.field == "topic"));
    }

    #[test]
    fn fallback_answers_without_store() {
        let result = service(Precedents)
            .search(&raw(json!({ "topic": "greve", "relevanceThreshold": 0 })))
            .expect("search succeeds");
        assert_eq!(result.total_found, 5);
        assert_eq!(result.query, "greve");
    }

    #[test]
    fn store_is_retried_on_every_call() {
        let store = Arc::new(Flaky {
            calls: AtomicUsize::new(0),
            hits: vec![hit(0.99, "STJ")],
        });
        let service = service(Precedents).with_store(store);
        let query = raw(json!({ "topic": "greve", "relevanceThreshold": 0 }));

        let first = service.search(&query).expect("fallback answers");
        assert_eq!(first.total_found, 5);

        let second = service.search(&query).expect("store answers");
        assert_eq!(second.total_found, 1);
        assert_eq!(second.results[0].title, "live");
    }

    #[test]
    fn non_finite_scores_are_wrapped_for_the_caller() {
        let store = Arc::new(Corpus(vec![hit(f32::NAN, "STF")]));
        let err = service(Precedents)
            .with_store(store)
            .search(&raw(json!({ "topic": "direito à greve" })))
            .expect_err("NaN score is a bug");
        match &err {
            DomainError::ToolCall { query, kind, .. } => {
                assert_eq!(query, "direito à greve");
                assert_eq!(kind, "UnexpectedError");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.to_string().contains("raised the following error"));
    }

    #[test]
    fn template_other_type_passes_through() {
        let result = service(ContractTemplates)
            .search(&raw(json!({
                "topic": "contrato de locação",
                "contractType": "outro",
                "relevanceThreshold": 0
            })))
            .expect("search succeeds");
        assert_eq!(result.results.len(), 5);

        let locacao = service(ContractTemplates)
            .search(&raw(json!({
                "topic": "contrato de locação",
                "contractType": "locacao",
                "relevanceThreshold": 0
            })))
            .expect("search succeeds");
        assert_eq!(locacao.results.len(), 1);
        assert_eq!(locacao.results[0].contract_type, "locacao");
    }

    struct Slow;

    impl EmbeddingEngine for Slow {
        fn model(&self) -> &str {
            "slow"
        }

        fn embed(&self, _text: &str) -> Result<Vec<f32>, DomainError> {
            std::thread::sleep(std::time::Duration::from_millis(25));
            Ok(vec![0.0; 4])
        }
    }

    #[test]
    fn execution_time_covers_the_whole_pipeline() {
        let service = RetrievalService::new(
            Precedents,
            EmbeddingProvider::new(Some(Arc::new(Slow)), Arc::new(Zeros), 4),
            Arc::new(Corpus(Precedents.fallback_corpus())),
        );
        let result = service
            .search(&raw(json!({ "topic": "greve" })))
            .expect("search succeeds");
        assert!(result.execution_time_ms >= 25);
    }

    #[test]
    fn bounded_search_accepts_long_topics() {
        let topic = "cláusula de reajuste anual pelo IGP-M. ".repeat(30);
        let query = raw(json!({ "topic": topic, "relevanceThreshold": 0 }));

        assert!(matches!(
            service(ContractTemplates).search(&query),
            Err(DomainError::Validation(_))
        ));
        let result = service(ContractTemplates)
            .search_bounded(&query, 2_000)
            .expect("long excerpt accepted");
        assert_eq!(result.total_found, 5);
        assert_eq!(result.query, topic);
    }

    #[test]
    fn health_reports_degraded_store() {
        assert!(service(Precedents).health().ok);
        let flaky = Arc::new(Flaky {
            calls: AtomicUsize::new(0),
            hits: Vec::new(),
        });
        let status = service(Precedents).with_store(flaky).health();
        assert!(!status.ok);
        assert!(status.message.starts_with("degraded"));
    }
}
