use chrono::{Months, NaiveDate, Utc};
use serde_json::{Map, Value};

use crate::domain::{DocumentDomain, SearchQuery, ValidationError, ALL_CATEGORIES};

pub const MIN_TOPIC_CHARS: usize = 3;
pub const MAX_TOPIC_CHARS: usize = 500;
pub const MAX_LIMIT: usize = 50;
pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_RELEVANCE_THRESHOLD: f32 = 0.7;
/// Width of the default date window, counted back from today.
pub const DEFAULT_LOOKBACK_MONTHS: u32 = 60;

pub const TOPIC_FIELD: &str = "topic";
pub const START_DATE_FIELD: &str = "startDate";
pub const END_DATE_FIELD: &str = "endDate";
pub const LIMIT_FIELD: &str = "limit";
pub const THRESHOLD_FIELD: &str = "relevanceThreshold";

/// Portuguese spelling of the "no filter" sentinel, accepted for compatibility.
const ALL_CATEGORIES_ALIAS: &str = "todos";

/// Validate a raw request map into an immutable [`SearchQuery`].
///
/// Required fields are never coerced: a missing or malformed topic is an error.
/// Optional fields receive defaults only when absent or `null`.
pub fn validate_query<D: DocumentDomain + ?Sized>(
    domain: &D,
    raw: &Map<String, Value>,
) -> Result<SearchQuery, ValidationError> {
    validate_query_bounded(domain, raw, MAX_TOPIC_CHARS)
}

/// [`validate_query`] with a caller-chosen upper bound on topic length, for
/// queries built from document excerpts rather than typed by a user.
pub fn validate_query_bounded<D: DocumentDomain + ?Sized>(
    domain: &D,
    raw: &Map<String, Value>,
    max_topic_chars: usize,
) -> Result<SearchQuery, ValidationError> {
    let topic = validate_topic(raw.get(TOPIC_FIELD), max_topic_chars)?;
    let category = validate_category(domain, raw.get(domain.category_field()))?;

    let today = Utc::now().date_naive();
    let start_date = optional_date(raw, START_DATE_FIELD)?.unwrap_or_else(|| {
        today
            .checked_sub_months(Months::new(DEFAULT_LOOKBACK_MONTHS))
            .unwrap_or(NaiveDate::MIN)
    });
    let end_date = optional_date(raw, END_DATE_FIELD)?.unwrap_or(today);
    if start_date > end_date {
        return Err(ValidationError::new(
            START_DATE_FIELD,
            serde_json::json!({ START_DATE_FIELD: start_date, END_DATE_FIELD: end_date }),
            format!("{START_DATE_FIELD} ({start_date}) cannot be after {END_DATE_FIELD} ({end_date})"),
        ));
    }

    let limit = validate_limit(present(raw, LIMIT_FIELD))?;
    let relevance_threshold = validate_threshold(present(raw, THRESHOLD_FIELD))?;

    Ok(SearchQuery {
        topic,
        category,
        start_date,
        end_date,
        limit,
        relevance_threshold,
    })
}

fn present<'a>(raw: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    raw.get(field).filter(|value| !value.is_null())
}

/// Length is counted in characters on the text as received, which is also
/// what the query echoes back.
fn validate_topic(value: Option<&Value>, max_chars: usize) -> Result<String, ValidationError> {
    let received = value.cloned().unwrap_or(Value::Null);
    let topic = match value {
        None | Some(Value::Null) => {
            return Err(ValidationError::new(
                TOPIC_FIELD,
                received,
                format!("`{TOPIC_FIELD}` is required"),
            ))
        }
        Some(Value::String(topic)) => topic,
        Some(_) => {
            return Err(ValidationError::new(
                TOPIC_FIELD,
                received,
                format!("`{TOPIC_FIELD}` must be a string"),
            ))
        }
    };

    let chars = topic.chars().count();
    if chars < MIN_TOPIC_CHARS {
        return Err(ValidationError::new(
            TOPIC_FIELD,
            received,
            format!("`{TOPIC_FIELD}` must have at least {MIN_TOPIC_CHARS} characters"),
        ));
    }
    if chars > max_chars {
        return Err(ValidationError::new(
            TOPIC_FIELD,
            received,
            format!("`{TOPIC_FIELD}` cannot exceed {max_chars} characters (received {chars})"),
        ));
    }

    Ok(topic.clone())
}

fn validate_category<D: DocumentDomain + ?Sized>(
    domain: &D,
    value: Option<&Value>,
) -> Result<String, ValidationError> {
    let field = domain.category_field();
    let category = match value {
        None | Some(Value::Null) => return Ok(ALL_CATEGORIES.to_string()),
        Some(Value::String(category)) => category.as_str(),
        Some(other) => {
            return Err(ValidationError::new(
                field,
                other.clone(),
                format!("`{field}` must be a string"),
            ))
        }
    };

    if category == ALL_CATEGORIES || category == ALL_CATEGORIES_ALIAS {
        return Ok(ALL_CATEGORIES.to_string());
    }
    if domain.categories().contains(&category) {
        return Ok(category.to_string());
    }

    Err(ValidationError::new(
        field,
        Value::String(category.to_string()),
        format!(
            "invalid {field} '{category}'. Accepted values: {}, {ALL_CATEGORIES}",
            domain.categories().join(", ")
        ),
    ))
}

fn optional_date(
    raw: &Map<String, Value>,
    field: &str,
) -> Result<Option<NaiveDate>, ValidationError> {
    let Some(value) = present(raw, field) else {
        return Ok(None);
    };
    let invalid = || {
        ValidationError::new(
            field,
            value.clone(),
            format!("invalid date {value}; use the YYYY-MM-DD format"),
        )
    };

    let text = value.as_str().ok_or_else(invalid)?;
    if !is_iso_date_shape(text) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| invalid())
}

/// `YYYY-MM-DD` with exactly four, two, and two digits.
fn is_iso_date_shape(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(idx, byte)| match idx {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

fn validate_limit(value: Option<&Value>) -> Result<usize, ValidationError> {
    let Some(value) = value else {
        return Ok(DEFAULT_LIMIT);
    };

    let limit = value
        .as_i64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|float| float.fract() == 0.0 && float.abs() < i64::MAX as f64)
                .map(|float| float as i64)
        })
        .ok_or_else(|| {
            ValidationError::new(
                LIMIT_FIELD,
                value.clone(),
                format!("`{LIMIT_FIELD}` must be an integer"),
            )
        })?;

    if limit < 1 {
        return Err(ValidationError::new(
            LIMIT_FIELD,
            value.clone(),
            format!("`{LIMIT_FIELD}` must be greater than 0"),
        ));
    }
    if limit > MAX_LIMIT as i64 {
        return Err(ValidationError::new(
            LIMIT_FIELD,
            value.clone(),
            format!("`{LIMIT_FIELD}` cannot exceed {MAX_LIMIT}"),
        ));
    }

    Ok(limit as usize)
}

fn validate_threshold(value: Option<&Value>) -> Result<f32, ValidationError> {
    let Some(value) = value else {
        return Ok(DEFAULT_RELEVANCE_THRESHOLD);
    };

    let threshold = value.as_f64().ok_or_else(|| {
        ValidationError::new(
            THRESHOLD_FIELD,
            value.clone(),
            format!("`{THRESHOLD_FIELD}` must be a number"),
        )
    })?;

    if !(0.0..=1.0).contains(&threshold) {
        return Err(ValidationError::new(
            THRESHOLD_FIELD,
            value.clone(),
            format!("`{THRESHOLD_FIELD}` must be between 0 and 1"),
        ));
    }

    Ok(threshold as f32)
}
