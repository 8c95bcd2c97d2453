use serde_json::Value;
use thiserror::Error;

/// Rejected caller input, naming the offending field and what was received.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: String,
    pub received: Value,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, received: Value, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            received,
            message: message.into(),
        }
    }
}

/// Domain-level errors shared across application components.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The incoming query missed a required field or violated a bound.
    #[error("validation error on `{}`: {}", .0.field, .0.message)]
    Validation(ValidationError),

    /// A backend was not configured for the requested operation.
    #[error("configuration missing: {0}")]
    Configuration(String),

    /// Embedding backend failed or answered with something unusable.
    #[error("embedding failure: {0}")]
    Embedding(String),

    /// Vector store call failed, timed out, or returned a malformed body.
    #[error("storage failure: {0}")]
    Storage(String),

    /// Any other unexpected failure.
    #[error("unexpected error: {0}")]
    Other(String),

    /// A failure that escaped every fallback, wrapped once for the calling agent.
    #[error(
        "Calling retrieval tool with query:\n\n{query}\n\nraised the following error:\n\n{kind}: {message}"
    )]
    ToolCall {
        query: String,
        kind: String,
        message: String,
    },
}

impl DomainError {
    pub fn validation(field: impl Into<String>, received: Value, msg: impl Into<String>) -> Self {
        Self::Validation(ValidationError::new(field, received, msg))
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Stable type name used when the error is wrapped for the caller.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::Configuration(_) => "ConfigurationError",
            Self::Embedding(_) => "EmbeddingError",
            Self::Storage(_) => "StorageError",
            Self::Other(_) => "UnexpectedError",
            Self::ToolCall { .. } => "ToolCallError",
        }
    }

    /// Wrap an escaped failure so it reads as a failed tool call for `query`.
    ///
    /// Validation errors and already-wrapped errors pass through untouched.
    pub fn into_tool_call(self, query: &str) -> Self {
        match self {
            Self::Validation(_) | Self::ToolCall { .. } => self,
            other => {
                let kind = other.kind().to_string();
                let message = match &other {
                    Self::Configuration(msg)
                    | Self::Embedding(msg)
                    | Self::Storage(msg)
                    | Self::Other(msg) => msg.clone(),
                    _ => other.to_string(),
                };
                Self::ToolCall {
                    query: query.to_string(),
                    kind,
                    message,
                }
            }
        }
    }
}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wraps_storage_failure_with_query_and_kind() {
        let wrapped = DomainError::storage("connection reset").into_tool_call("direito à greve");
        let text = wrapped.to_string();
        assert!(text.starts_with("Calling retrieval tool with query:\n\ndireito à greve\n\n"));
        assert!(text.ends_with("StorageError: connection reset"));
    }

    #[test]
    fn validation_is_never_wrapped() {
        let err = DomainError::validation("limit", json!(0), "limit must be at least 1");
        match err.into_tool_call("anything") {
            DomainError::Validation(inner) => {
                assert_eq!(inner.field, "limit");
                assert_eq!(inner.received, json!(0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn wrapping_is_applied_once() {
        let once = DomainError::other("boom").into_tool_call("q1");
        let twice = once.into_tool_call("q2");
        assert!(twice.to_string().contains("q1"));
        assert!(!twice.to_string().contains("q2"));
    }
}
