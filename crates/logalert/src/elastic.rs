//! Elasticsearch implementation of the log query gateway.
//!
//! Issues `_count` and `_search` requests against date-suffixed indices.
//! Both queries share the same inclusive range filter on the timestamp
//! field; the search adds an OR of `match_phrase` clauses on the error
//! field and asks for exact hit totals.

use chrono::{DateTime, Utc};
use logalert_core::{
    ErrorSearch, EvaluationWindow, IndexTarget, LogQueryGateway, LogRecord, PipelineError,
    SAMPLE_LIMIT,
};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::ElasticConfig;
use crate::error::Result;
use crate::http::{ensure_success, read_body};

/// Log store gateway backed by the Elasticsearch HTTP API.
#[derive(Debug, Clone)]
pub struct ElasticGateway {
    client: Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
    timestamp_field: String,
    error_field: String,
}

impl ElasticGateway {
    /// Creates a gateway from configuration and a shared client.
    #[must_use]
    pub fn new(config: &ElasticConfig, client: Client) -> Self {
        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            timestamp_field: config.timestamp_field.clone(),
            error_field: config.error_field.clone(),
        }
    }

    /// Builds the `_count` request body.
    #[must_use]
    pub fn count_body(&self, window: &EvaluationWindow) -> Value {
        json!({
            "query": {
                "bool": {
                    "filter": [self.range_filter(window)]
                }
            }
        })
    }

    /// Builds the `_search` request body.
    ///
    /// A single pattern becomes a `must` clause; several patterns become
    /// `should` clauses of which at least one has to match.
    #[must_use]
    pub fn search_body(&self, window: &EvaluationWindow, patterns: &[String]) -> Value {
        let phrases: Vec<Value> = patterns
            .iter()
            .map(|p| json!({ "match_phrase": { self.error_field.as_str(): p } }))
            .collect();

        let query = if phrases.len() == 1 {
            json!({
                "bool": {
                    "filter": [self.range_filter(window)],
                    "must": phrases
                }
            })
        } else {
            json!({
                "bool": {
                    "filter": [self.range_filter(window)],
                    "should": phrases,
                    "minimum_should_match": 1
                }
            })
        };

        json!({
            "size": SAMPLE_LIMIT,
            "track_total_hits": true,
            "query": query
        })
    }

    fn range_filter(&self, window: &EvaluationWindow) -> Value {
        json!({
            "range": {
                self.timestamp_field.as_str(): {
                    "gte": window.start_rfc3339(),
                    "lte": window.end_rfc3339(),
                    "format": "strict_date_optional_time"
                }
            }
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}/{}", self.base_url, path));
        match self.username {
            Some(ref user) => builder.basic_auth(user, self.password.as_deref()),
            None => builder,
        }
    }

    /// Posts `body` to `{index}/{endpoint}`; `None` means the index does not exist.
    async fn post_index(
        &self,
        index: &IndexTarget,
        endpoint: &str,
        body: &Value,
    ) -> Result<Option<String>> {
        let path = format!("{}/{endpoint}", index.name());
        let response = self.request(Method::POST, &path).json(body).send().await?;
        let (status, text) = read_body(response).await?;

        if is_index_missing(status, &text) {
            debug!(index = %index, "index does not exist yet");
            return Ok(None);
        }
        ensure_success(status, &text)?;
        Ok(Some(text))
    }
}

impl LogQueryGateway for ElasticGateway {
    async fn ping(&self) -> logalert_core::Result<()> {
        let unavailable = |reason: String| PipelineError::StoreUnavailable { reason };

        let response = self
            .request(Method::GET, "")
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        let (status, text) = read_body(response)
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        ensure_success(status, &text).map_err(|e| unavailable(e.to_string()))?;

        debug!(url = %self.base_url, "log store reachable");
        Ok(())
    }

    async fn count_total(
        &self,
        index: &IndexTarget,
        window: &EvaluationWindow,
    ) -> logalert_core::Result<u64> {
        let body = self.count_body(window);
        let text = self
            .post_index(index, "_count", &body)
            .await
            .map_err(|e| e.into_query(index.name()))?;

        match text {
            Some(text) => decode_count(&text).map_err(|e| e.into_query(index.name())),
            None => Ok(0),
        }
    }

    async fn search_errors(
        &self,
        index: &IndexTarget,
        window: &EvaluationWindow,
        patterns: &[String],
    ) -> logalert_core::Result<ErrorSearch> {
        let body = self.search_body(window, patterns);
        let text = self
            .post_index(index, "_search", &body)
            .await
            .map_err(|e| e.into_query(index.name()))?;

        match text {
            Some(text) => {
                decode_search(&text, &self.timestamp_field, &self.error_field, window.end())
                    .map_err(|e| e.into_query(index.name()))
            }
            None => Ok(ErrorSearch::empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    total: Option<TotalHits>,
    #[serde(default)]
    hits: Vec<Hit>,
}

/// `hits.total` is an object since 7.x and a bare number before.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TotalHits {
    Object { value: u64 },
    Legacy(u64),
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source", default)]
    source: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: String,
}

fn is_index_missing(status: StatusCode, body: &str) -> bool {
    if status != StatusCode::NOT_FOUND {
        return false;
    }
    serde_json::from_str::<ErrorResponse>(body)
        .is_ok_and(|r| r.error.kind == "index_not_found_exception")
}

/// Decodes a `_count` response.
///
/// # Errors
///
/// Returns `AppError::Decode` if the body is not a count response.
pub fn decode_count(body: &str) -> Result<u64> {
    let response: CountResponse = serde_json::from_str(body)?;
    Ok(response.count)
}

/// Decodes a `_search` response into an [`ErrorSearch`].
///
/// Hits without a message field are skipped; other message values are
/// rendered with [`message_text`]. A missing or unparsable timestamp falls
/// back to `fallback_ts`.
///
/// # Errors
///
/// Returns `AppError::Decode` if the body is not a search response.
pub fn decode_search(
    body: &str,
    timestamp_field: &str,
    error_field: &str,
    fallback_ts: DateTime<Utc>,
) -> Result<ErrorSearch> {
    let response: SearchResponse = serde_json::from_str(body)?;
    let hits = response.hits;

    let records: Vec<LogRecord> = hits
        .hits
        .iter()
        .filter_map(|hit| {
            let message = message_text(lookup(&hit.source, error_field)?)?;
            let timestamp = lookup(&hit.source, timestamp_field)
                .and_then(parse_timestamp)
                .unwrap_or(fallback_ts);
            Some(LogRecord::new(timestamp, message))
        })
        .collect();

    let total_errors = match hits.total {
        Some(TotalHits::Object { value } | TotalHits::Legacy(value)) => value,
        None => hits.hits.len() as u64,
    };

    Ok(ErrorSearch::new(records, total_errors))
}

/// Finds `field` in a document, trying the literal key before a dotted path.
fn lookup<'a>(source: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    if let Some(value) = source.get(field) {
        return Some(value);
    }
    let mut parts = field.split('.');
    let mut current = source.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Renders a message field as text; string arrays are joined with spaces.
fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::Null => None,
                    Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
                .collect();
            Some(parts.join(" "))
        }
        other => Some(other.to_string()),
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}
