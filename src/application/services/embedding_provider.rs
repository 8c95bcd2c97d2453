use std::sync::Arc;

use tracing::{debug, warn};

use super::EmbeddingEngine;
use crate::domain::{DomainError, QueryEmbedding};

/// Turns query text into a vector, degrading to a synthetic one when the
/// configured backend is missing or failing.
#[derive(Clone)]
pub struct EmbeddingProvider {
    primary: Option<Arc<dyn EmbeddingEngine>>,
    fallback: Arc<dyn EmbeddingEngine>,
    dimensions: usize,
}

impl EmbeddingProvider {
    pub fn new(
        primary: Option<Arc<dyn EmbeddingEngine>>,
        fallback: Arc<dyn EmbeddingEngine>,
        dimensions: usize,
    ) -> Self {
        Self {
            primary,
            fallback,
            dimensions,
        }
    }

    /// Provider that never leaves the synthetic path.
    pub fn offline(fallback: Arc<dyn EmbeddingEngine>, dimensions: usize) -> Self {
        Self::new(None, fallback, dimensions)
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn is_configured(&self) -> bool {
        self.primary.is_some()
    }

    pub fn embed(&self, text: &str) -> Result<QueryEmbedding, DomainError> {
        let Some(engine) = &self.primary else {
            debug!(
                target: "jurisearch::embedding",
                "no embedding backend configured; using synthetic vector"
            );
            return self.synthetic(text);
        };

        match engine.embed(text) {
            Ok(vector) if vector.is_empty() => {
                warn!(
                    target: "jurisearch::embedding",
                    model = engine.model(),
                    "embedding backend returned an empty vector; using synthetic vector"
                );
                self.synthetic(text)
            }
            Ok(vector) => {
                if vector.len() != self.dimensions {
                    warn!(
                        target: "jurisearch::embedding",
                        model = engine.model(),
                        expected = self.dimensions,
                        actual = vector.len(),
                        "embedding dimension mismatch"
                    );
                }
                Ok(QueryEmbedding::new(engine.model(), vector))
            }
            Err(err) => {
                warn!(
                    target: "jurisearch::embedding",
                    model = engine.model(),
                    error = %err,
                    "embedding backend failed; using synthetic vector"
                );
                self.synthetic(text)
            }
        }
    }

    fn synthetic(&self, text: &str) -> Result<QueryEmbedding, DomainError> {
        let vector = self.fallback.embed(text)?;
        Ok(QueryEmbedding::synthetic(self.fallback.model(), vector))
    }
}
