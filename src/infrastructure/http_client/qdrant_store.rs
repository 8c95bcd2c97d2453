//! Qdrant-compatible vector store client.

use std::time::Duration;

use serde_json::{json, Map, Value};
use tracing::debug;

use super::describe_http_error;
use crate::application::services::CandidateSource;
use crate::domain::{Candidate, DomainError, QueryEmbedding};
use crate::settings::VectorStoreSettings;

const MAX_VECTOR_DIMS: usize = 10_000;
const MAX_TOP_K: usize = 100;

/// Read-only search client for one collection. Built once per engine and shared
/// across calls; it holds no mutable state.
pub struct QdrantVectorStore {
    base_url: String,
    api_key: String,
    collection: String,
    label: String,
    agent: ureq::Agent,
}

impl QdrantVectorStore {
    /// Create a client, failing when the URL or API key is missing.
    pub fn try_new(settings: &VectorStoreSettings) -> Result<Self, DomainError> {
        let (url, api_key) = settings.credentials().ok_or_else(|| {
            DomainError::configuration(format!(
                "vector store for collection `{}` is not configured",
                settings.collection
            ))
        })?;

        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build();

        Ok(Self {
            base_url: url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            collection: settings.collection.clone(),
            label: format!("qdrant:{}", settings.collection),
            agent,
        })
    }

    /// Get the collection endpoint URL
    fn collection_url(&self, path: &str) -> String {
        let base = format!(
            "{}/collections/{}",
            self.base_url,
            urlencoding::encode(&self.collection)
        );
        if path.is_empty() {
            base
        } else {
            format!("{base}/{path}")
        }
    }

    fn validate_request(vector: &[f32], top_k: usize) -> Result<(), DomainError> {
        if vector.is_empty() || vector.len() > MAX_VECTOR_DIMS {
            return Err(DomainError::storage(format!(
                "vector length must be between 1 and {MAX_VECTOR_DIMS} (got {})",
                vector.len()
            )));
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(DomainError::storage("vector must contain only finite numbers"));
        }
        if !(1..=MAX_TOP_K).contains(&top_k) {
            return Err(DomainError::storage(format!(
                "top_k must be between 1 and {MAX_TOP_K} (got {top_k})"
            )));
        }
        Ok(())
    }

    /// Keep object rows only; a non-numeric score reads as 0 and a missing
    /// payload as an empty map.
    fn sanitize(rows: &[Value]) -> Vec<Candidate> {
        rows.iter()
            .filter_map(Value::as_object)
            .map(|row| Candidate {
                id: row.get("id").cloned(),
                score: row.get("score").and_then(Value::as_f64).unwrap_or(0.0) as f32,
                payload: row
                    .get("payload")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_else(Map::new),
            })
            .collect()
    }
}

impl CandidateSource for QdrantVectorStore {
    fn label(&self) -> &str {
        &self.label
    }

    fn search(
        &self,
        embedding: &QueryEmbedding,
        top_k: usize,
    ) -> Result<Vec<Candidate>, DomainError> {
        Self::validate_request(&embedding.vector, top_k)?;

        let url = self.collection_url("points/search");
        debug!(
            target: "jurisearch::store",
            collection = %self.collection,
            top_k,
            "searching vector store"
        );

        let response = self
            .agent
            .post(&url)
            .set("api-key", &self.api_key)
            .send_json(json!({
                "vector": &embedding.vector,
                "limit": top_k,
                "with_payload": true,
                "with_vector": false,
            }))
            .map_err(|err| DomainError::storage(describe_http_error(err)))?;

        let body: Value = response
            .into_json()
            .map_err(|err| DomainError::storage(format!("failed to parse search response: {err}")))?;

        let rows: &[Value] = match body.get("result") {
            Some(Value::Array(rows)) => rows.as_slice(),
            Some(Value::Null) | None => &[],
            Some(_) => return Err(DomainError::storage("invalid search response format")),
        };

        Ok(Self::sanitize(rows))
    }

    fn ping(&self) -> Result<(), DomainError> {
        self.agent
            .get(&self.collection_url(""))
            .set("api-key", &self.api_key)
            .call()
            .map_err(|err| DomainError::storage(format!("health check failed: {}", describe_http_error(err))))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::services::{EmbeddingProvider, RetrievalService};
    use crate::domain::Precedents;
    use crate::infrastructure::http_client::testing::{closed_port, serve_once, serve_silent};
    use crate::infrastructure::{FallbackCorpus, RandomEmbedEngine};

    fn settings(url: String) -> VectorStoreSettings {
        VectorStoreSettings {
            url: Some(url),
            api_key: Some("qdrant-key".into()),
            collection: "jurisprudencias".into(),
            timeout_ms: 2_000,
        }
    }

    fn embedding(dims: usize) -> QueryEmbedding {
        QueryEmbedding::new("test", vec![0.25; dims])
    }

    #[test]
    fn missing_credentials_fail_construction() {
        let mut incomplete = settings("http://localhost:6333".into());
        incomplete.api_key = None;
        assert!(matches!(
            QdrantVectorStore::try_new(&incomplete),
            Err(DomainError::Configuration(_))
        ));
    }

    #[test]
    fn builds_collection_urls() {
        let store = QdrantVectorStore::try_new(&settings("http://localhost:6333/".into()))
            .expect("configured");
        assert_eq!(
            store.collection_url("points/search"),
            "http://localhost:6333/collections/jurisprudencias/points/search"
        );
        assert_eq!(store.label(), "qdrant:jurisprudencias");
    }

    #[test]
    fn rejects_invalid_requests_before_sending() {
        let store = QdrantVectorStore::try_new(&settings(closed_port())).expect("configured");
        assert!(store.search(&embedding(0), 10).is_err());
        assert!(store.search(&QueryEmbedding::new("t", vec![f32::NAN]), 10).is_err());
        assert!(store.search(&embedding(8), 0).is_err());
        assert!(store.search(&embedding(8), 101).is_err());
    }

    #[test]
    fn parses_and_sanitizes_results() {
        let (url, request) = serve_once(
            200,
            r#"{"result":[
                {"id":1,"score":0.91,"payload":{"title":"STF - RE 1","court":"STF"}},
                {"id":"b","score":"high","payload":null},
                "garbage"
            ],"status":"ok"}"#,
        );
        let store = QdrantVectorStore::try_new(&settings(url)).expect("configured");
        let candidates = store.search(&embedding(4), 10).expect("search succeeds");

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].score, 0.91);
        assert_eq!(candidates[0].text("court"), Some("STF"));
        assert_eq!(candidates[1].score, 0.0);
        assert!(candidates[1].payload.is_empty());

        let request = request.join().expect("server thread");
        assert!(request.starts_with("POST /collections/jurisprudencias/points/search"));
        assert!(request.to_ascii_lowercase().contains("api-key: qdrant-key"));
        assert!(request.contains(r#""with_payload":true"#));
    }

    #[test]
    fn server_errors_surface_as_storage_errors() {
        let (url, _request) = serve_once(503, r#"{"status":{"error":"overloaded"}}"#);
        let store = QdrantVectorStore::try_new(&settings(url)).expect("configured");
        let err = store.search(&embedding(4), 5).expect_err("503");
        assert!(matches!(err, DomainError::Storage(ref msg) if msg.contains("503")));
    }

    #[test]
    fn unreachable_store_is_a_storage_error() {
        let store = QdrantVectorStore::try_new(&settings(closed_port())).expect("configured");
        assert!(matches!(store.search(&embedding(4), 5), Err(DomainError::Storage(_))));
        assert!(store.ping().is_err());
    }

    #[test]
    fn unanswered_search_times_out_and_fallback_answers() {
        let (url, server) = serve_silent();
        let mut silent = settings(url);
        silent.timeout_ms = 200;
        let store = QdrantVectorStore::try_new(&silent).expect("configured");

        let engine = RandomEmbedEngine::try_new("synthetic", 8).expect("dims");
        let service = RetrievalService::new(
            Precedents,
            EmbeddingProvider::offline(Arc::new(engine), 8),
            Arc::new(FallbackCorpus::for_domain(&Precedents)),
        )
        .with_store(Arc::new(store));

        let query = serde_json::json!({ "topic": "greve", "relevanceThreshold": 0 });
        let result = service
            .search(query.as_object().expect("object"))
            .expect("fallback corpus answers");
        assert_eq!(result.total_found, 5);
        assert_eq!(result.results[0].relevance, 0.92);

        drop(service);
        server.join().expect("server thread");
    }

    #[test]
    fn unanswered_search_is_a_storage_error() {
        let (url, _server) = serve_silent();
        let mut silent = settings(url);
        silent.timeout_ms = 200;
        let store = QdrantVectorStore::try_new(&silent).expect("configured");
        assert!(matches!(store.search(&embedding(4), 5), Err(DomainError::Storage(_))));
    }
}
