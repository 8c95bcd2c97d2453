use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::debug;

use crate::{
    application::services::EmbeddingEngine,
    domain::DomainError,
    infrastructure::http_client::describe_http_error,
    settings::EmbeddingSettings,
};

/// Remote embedding engine speaking the Gemini `embedContent` wire format.
pub struct GeminiEmbedEngine {
    endpoint: String,
    api_key: String,
    model: String,
    dimensions: usize,
    agent: ureq::Agent,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

impl GeminiEmbedEngine {
    /// Build the engine, failing when no API key is configured.
    pub fn try_new(settings: &EmbeddingSettings) -> Result<Self, DomainError> {
        let api_key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| DomainError::configuration("embedding API key is not set"))?;

        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build();

        Ok(Self {
            endpoint: settings.endpoint(),
            api_key: api_key.to_string(),
            model: settings.model.clone(),
            dimensions: settings.dimensions,
            agent,
        })
    }

    fn request_url(&self) -> String {
        format!("{}?key={}", self.endpoint, urlencoding::encode(&self.api_key))
    }
}

impl EmbeddingEngine for GeminiEmbedEngine {
    fn model(&self) -> &str {
        &self.model
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        if text.trim().is_empty() {
            return Err(DomainError::embedding("text payload cannot be empty"));
        }

        let started = Instant::now();
        let body = serde_json::json!({
            "model": format!("models/{}", self.model),
            "content": { "parts": [{ "text": text }] },
        });

        let response = self
            .agent
            .post(&self.request_url())
            .send_json(body)
            .map_err(|err| DomainError::embedding(describe_http_error(err)))?;

        let parsed: EmbedContentResponse = response
            .into_json()
            .map_err(|err| DomainError::embedding(format!("invalid embedding response: {err}")))?;

        debug!(
            target: "jurisearch::embedding",
            model = %self.model,
            dims = parsed.embedding.values.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "embedding generated"
        );

        Ok(parsed.embedding.values)
    }

    fn dims(&self) -> Option<usize> {
        Some(self.dimensions)
    }
}
