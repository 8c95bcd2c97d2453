use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default filename looked up within the platform config directory.
const CONFIG_FILENAME: &str = "config.json";

const ENV_CONFIG_PATH: &str = "JURISEARCH_CONFIG";
const ENV_EMBEDDING_KEY: &str = "GEMINI_API_KEY";
const ENV_EMBEDDING_URL: &str = "JURISEARCH_EMBEDDING_URL";
const ENV_EMBEDDING_MODEL: &str = "JURISEARCH_EMBEDDING_MODEL";
const ENV_EMBEDDING_DIMS: &str = "JURISEARCH_EMBEDDING_DIMENSIONS";
const ENV_EMBEDDING_TIMEOUT: &str = "JURISEARCH_EMBEDDING_TIMEOUT_MS";
const ENV_STORE_TIMEOUT: &str = "JURISEARCH_STORE_TIMEOUT_MS";
const ENV_SHARED_QDRANT_URL: &str = "QDRANT_URL";
const ENV_SHARED_QDRANT_KEY: &str = "QDRANT_API_KEY";

/// Remote embedding backend settings. A missing API key means synthetic vectors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbeddingSettings {
    pub api_key: Option<String>,
    /// Full `embedContent` URL; derived from `model` when unset.
    pub endpoint: Option<String>,
    pub model: String,
    pub dimensions: usize,
    pub timeout_ms: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: None,
            model: default_embedding_model(),
            dimensions: 768,
            timeout_ms: 10_000,
        }
    }
}

impl EmbeddingSettings {
    pub fn endpoint(&self) -> String {
        self.endpoint.clone().unwrap_or_else(|| {
            format!(
                "https://generativelanguage.googleapis.com/v1/models/{}:embedContent",
                self.model
            )
        })
    }

    pub fn is_configured(&self) -> bool {
        non_empty(self.api_key.as_deref()).is_some()
    }
}

/// Connection settings for one vector collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VectorStoreSettings {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    pub collection: String,
    #[serde(default = "default_store_timeout")]
    pub timeout_ms: u64,
}

impl VectorStoreSettings {
    pub fn for_collection(collection: impl Into<String>) -> Self {
        Self {
            url: None,
            api_key: None,
            collection: collection.into(),
            timeout_ms: default_store_timeout(),
        }
    }

    /// URL and key, when both are present and non-blank.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((
            non_empty(self.url.as_deref())?,
            non_empty(self.api_key.as_deref())?,
        ))
    }

    pub fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }
}

/// Complete configuration payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub embedding: EmbeddingSettings,
    pub precedents: VectorStoreSettings,
    pub templates: VectorStoreSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            embedding: EmbeddingSettings::default(),
            precedents: VectorStoreSettings::for_collection("jurisprudencias"),
            templates: VectorStoreSettings::for_collection("contratos_templates"),
        }
    }
}

impl AppConfig {
    /// Defaults, then the JSON config file (if any), then process environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .or_else(default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Overlay values from an environment lookup. Unparseable numbers are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = get(ENV_EMBEDDING_KEY) {
            self.embedding.api_key = Some(key);
        }
        if let Some(url) = get(ENV_EMBEDDING_URL) {
            self.embedding.endpoint = Some(url);
        }
        if let Some(model) = get(ENV_EMBEDDING_MODEL) {
            self.embedding.model = model;
        }
        if let Some(dims) = get(ENV_EMBEDDING_DIMS).and_then(|raw| raw.parse::<usize>().ok()) {
            self.embedding.dimensions = dims.max(1);
        }
        if let Some(ms) = get(ENV_EMBEDDING_TIMEOUT).and_then(|raw| raw.parse::<u64>().ok()) {
            self.embedding.timeout_ms = ms.max(1);
        }

        let store_timeout = get(ENV_STORE_TIMEOUT).and_then(|raw| raw.parse::<u64>().ok());
        let shared_url = get(ENV_SHARED_QDRANT_URL);
        let shared_key = get(ENV_SHARED_QDRANT_KEY);

        for (prefix, store) in [
            ("JURISEARCH_PRECEDENTS", &mut self.precedents),
            ("JURISEARCH_TEMPLATES", &mut self.templates),
        ] {
            if let Some(url) = get(&format!("{prefix}_QDRANT_URL")).or_else(|| shared_url.clone()) {
                store.url = Some(url);
            }
            if let Some(key) =
                get(&format!("{prefix}_QDRANT_API_KEY")).or_else(|| shared_key.clone())
            {
                store.api_key = Some(key);
            }
            if let Some(collection) = get(&format!("{prefix}_COLLECTION")) {
                store.collection = collection;
            }
            if let Some(ms) = store_timeout {
                store.timeout_ms = ms.max(1);
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "jurisearch", "Jurisearch")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

const fn default_store_timeout() -> u64 {
    30_000
}

fn default_embedding_model() -> String {
    "text-embedding-004".to_string()
}
