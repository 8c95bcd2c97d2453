use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Category value that disables the category filter.
pub const ALL_CATEGORIES: &str = "all";

/// Upper bound to keep tag arrays compact when mapping loosely typed payloads.
pub const MAX_TAGS: usize = 12;

/// Validated search request. Built by the query validator and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub topic: String,
    pub category: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub limit: usize,
    pub relevance_threshold: f32,
}

/// Vector representation of a query, produced fresh for every search.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryEmbedding {
    pub model: String,
    pub vector: Vec<f32>,
    /// Set when the vector is synthetic because the embedding backend was unusable.
    pub degraded: bool,
}

impl QueryEmbedding {
    pub fn new(model: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            model: model.into(),
            vector,
            degraded: false,
        }
    }

    pub fn synthetic(model: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            degraded: true,
            ..Self::new(model, vector)
        }
    }

    pub fn dims(&self) -> usize {
        self.vector.len()
    }
}

/// Opaque nearest-neighbour hit as returned by a candidate source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub score: f32,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl Candidate {
    pub fn new(score: f32, payload: Map<String, Value>) -> Self {
        Self {
            id: None,
            score,
            payload,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.payload
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn text_or(&self, key: &str, default: &str) -> String {
        self.text(key).unwrap_or(default).to_string()
    }

    /// First non-blank text under any of `keys`, in order.
    pub fn first_text(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.text(key))
    }

    pub fn first_text_or(&self, keys: &[&str], default: &str) -> String {
        self.first_text(keys).unwrap_or(default).to_string()
    }

    pub fn tags(&self, key: &str) -> Vec<String> {
        self.payload
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .take(MAX_TAGS)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Shared shape of the documents the ranking stages operate on.
pub trait RankedDocument {
    fn relevance(&self) -> f32;

    /// Value of the categorical dimension (court, contract type).
    fn category(&self) -> &str;
}

/// Case-law precedent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Precedent {
    pub title: String,
    pub summary: String,
    pub relevance: f32,
    pub court: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rapporteur: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RankedDocument for Precedent {
    fn relevance(&self) -> f32 {
        self.relevance
    }

    fn category(&self) -> &str {
        &self.court
    }
}

/// Contract template with its standard clauses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractTemplate {
    pub title: String,
    pub description: String,
    pub relevance: f32,
    pub contract_type: String,
    #[serde(default)]
    pub clauses: Vec<StandardClause>,
    pub version: String,
    pub last_updated: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RankedDocument for ContractTemplate {
    fn relevance(&self) -> f32 {
        self.relevance
    }

    fn category(&self) -> &str {
        &self.contract_type
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardClause {
    #[serde(alias = "numero")]
    pub number: String,
    #[serde(alias = "titulo")]
    pub title: String,
    #[serde(alias = "texto")]
    pub text: String,
    #[serde(default, alias = "obrigatoria")]
    pub mandatory: bool,
    #[serde(default, alias = "comentarios", skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// Response envelope for a single search call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult<T> {
    pub results: Vec<T>,
    /// Matches after filtering, before truncation to the requested limit.
    pub total_found: usize,
    pub avg_relevance: f32,
    pub query: String,
    pub execution_time_ms: u64,
}

impl<T> SearchResult<T> {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.total_found > self.results.len()
    }
}

/// Today's date in `YYYY-MM-DD`, used as the default for undated payloads.
pub fn today_iso() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}
