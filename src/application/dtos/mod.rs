#[cfg(feature = "mcp-server")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Characters of a contract body used as the query when looking up templates for it.
pub const CONTRACT_EXCERPT_CHARS: usize = 1000;
const CONTRACT_REVIEW_LIMIT: usize = 5;
const CONTRACT_REVIEW_THRESHOLD: f64 = 0.6;

/// Precedent search as sent by MCP clients.
#[cfg_attr(feature = "mcp-server", derive(JsonSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecedentSearchRequest {
    /// Free-text legal topic, 3 to 500 characters.
    pub topic: Option<String>,
    /// STF, STJ, TST, TRF1..TRF5, or "all".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_threshold: Option<f64>,
}

/// Contract template search as sent by MCP clients.
#[cfg_attr(feature = "mcp-server", derive(JsonSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSearchRequest {
    pub topic: Option<String>,
    /// prestacao_servicos, compra_venda, locacao, trabalhista, societario, outro, or "all".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_threshold: Option<f64>,
}

/// Find templates resembling an existing contract.
#[cfg_attr(feature = "mcp-server", derive(JsonSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractReviewRequest {
    pub contract_text: String,
    #[serde(default)]
    pub contract_type: Option<String>,
}

/// Health/readiness report for diagnostics.
#[cfg_attr(feature = "mcp-server", derive(JsonSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatusResponse {
    pub ok: bool,
    pub message: String,
    pub details: Option<String>,
}

/// Raw field map handed to the query validator.
pub trait IntoRawQuery {
    fn into_raw(self) -> Map<String, Value>;
}

impl<T: Serialize> IntoRawQuery for T {
    fn into_raw(self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Template query for a contract under review: the first
/// [`CONTRACT_EXCERPT_CHARS`] characters of its text, five results, threshold 0.6.
pub fn template_query_from_contract(request: &ContractReviewRequest) -> Map<String, Value> {
    let excerpt: String = request
        .contract_text
        .chars()
        .take(CONTRACT_EXCERPT_CHARS)
        .collect();

    let mut raw = Map::new();
    raw.insert("topic".into(), Value::String(excerpt));
    if let Some(contract_type) = &request.contract_type {
        raw.insert("contractType".into(), Value::String(contract_type.clone()));
    }
    raw.insert("limit".into(), json!(CONTRACT_REVIEW_LIMIT));
    raw.insert("relevanceThreshold".into(), json!(CONTRACT_REVIEW_THRESHOLD));
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_stay_absent_in_raw_query() {
        let raw = PrecedentSearchRequest {
            topic: Some("greve".into()),
            court: Some("STF".into()),
            ..Default::default()
        }
        .into_raw();
        assert_eq!(raw.get("topic"), Some(&json!("greve")));
        assert_eq!(raw.get("court"), Some(&json!("STF")));
        assert!(!raw.contains_key("limit"));
        assert!(!raw.contains_key("startDate"));
    }

    #[test]
    fn contract_excerpt_is_capped_in_characters() {
        let request = ContractReviewRequest {
            contract_text: "é".repeat(1500),
            contract_type: Some("locacao".into()),
        };
        let raw = template_query_from_contract(&request);
        let topic = raw["topic"].as_str().expect("topic is a string");
        assert_eq!(topic.chars().count(), CONTRACT_EXCERPT_CHARS);
        assert_eq!(raw["limit"], json!(5));
        assert_eq!(raw["contractType"], json!("locacao"));
    }
}
