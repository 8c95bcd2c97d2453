use rand::Rng;

use crate::{application::services::EmbeddingEngine, domain::DomainError};

/// Synthetic embedding engine producing uniformly distributed values in `[0, 1)`.
///
/// The vector carries no meaning; it only has the right length so the rest of
/// the pipeline can proceed when the real embedding backend is unusable.
pub struct RandomEmbedEngine {
    model_name: String,
    dimensions: usize,
}

impl RandomEmbedEngine {
    pub fn try_new(model_name: impl Into<String>, dimensions: usize) -> Result<Self, DomainError> {
        if dimensions == 0 {
            return Err(DomainError::configuration(
                "embedding dimensions must be greater than zero",
            ));
        }
        Ok(Self {
            model_name: model_name.into(),
            dimensions: dimensions.min(10_000),
        })
    }

    fn embed_internal(&self) -> Vec<f32> {
        let mut rng = rand::thread_rng();
        (0..self.dimensions).map(|_| rng.gen::<f32>()).collect()
    }
}

impl Default for RandomEmbedEngine {
    fn default() -> Self {
        Self {
            model_name: "jurisearch/synthetic".to_string(),
            dimensions: 768,
        }
    }
}

impl EmbeddingEngine for RandomEmbedEngine {
    fn model(&self) -> &str {
        &self.model_name
    }

    fn embed(&self, _text: &str) -> Result<Vec<f32>, DomainError> {
        Ok(self.embed_internal())
    }

    fn dims(&self) -> Option<usize> {
        Some(self.dimensions)
    }
}
