//! Upstash Vector client — semantic search over pre-indexed documents.
//!
//! The index embeds text server-side, so a query is plain text plus an
//! optional metadata filter, and an upsert is plain text plus metadata. Both
//! search tools and the ingest command go through [`VectorIndex`].

use async_trait::async_trait;
use parley_config::VectorConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A metadata filter value.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Bool(bool),
}

/// Metadata filter, rendered in Upstash's SQL-like filter syntax.
///
/// Clauses keep insertion order and are joined with ` AND `:
/// `topic='AI' AND aiMentions=true`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorFilter {
    clauses: Vec<(String, FilterValue)>,
}

impl VectorFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `key='value'` when `value` is present and non-empty.
    pub fn text(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.clauses
                .push((key.to_string(), FilterValue::Text(v.to_string())));
        }
        self
    }

    /// Add `key=true|false` when `value` is present.
    pub fn boolean(mut self, key: &str, value: Option<bool>) -> Self {
        if let Some(v) = value {
            self.clauses.push((key.to_string(), FilterValue::Bool(v)));
        }
        self
    }

    /// The filter string, or `None` when there is nothing to filter on.
    ///
    /// Upstash string literals have no escape sequence, so a value holding
    /// both quote characters cannot be expressed and is rejected.
    pub fn render(&self) -> Result<Option<String>, VectorError> {
        if self.clauses.is_empty() {
            return Ok(None);
        }
        let parts = self
            .clauses
            .iter()
            .map(|(key, value)| match value {
                FilterValue::Bool(b) => Ok(format!("{key}={b}")),
                FilterValue::Text(s) if s.contains('\'') && s.contains('"') => Err(
                    VectorError::InvalidFilter(format!("value for `{key}` contains both ' and \"")),
                ),
                // Either quote style works; pick the one the value doesn't use
                FilterValue::Text(s) if s.contains('\'') => Ok(format!("{key}=\"{s}\"")),
                FilterValue::Text(s) => Ok(format!("{key}='{s}'")),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(parts.join(" AND ")))
    }
}

/// A query against the index.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Raw text; embedded by the index
    pub data: String,
    pub top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    pub include_metadata: bool,
    pub include_data: bool,
}

impl QueryRequest {
    pub fn new(data: impl Into<String>, top_k: usize, filter: &VectorFilter) -> Result<Self, VectorError> {
        Ok(Self {
            data: data.into(),
            top_k,
            filter: filter.render()?,
            include_metadata: true,
            include_data: true,
        })
    }
}

/// A document to store, keyed by `id`. `data` is embedded by the index.
#[derive(Debug, Clone, Serialize)]
pub struct UpsertRecord {
    pub id: String,
    pub data: String,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// One search hit.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorMatch {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub data: Option<String>,
}

impl VectorMatch {
    /// A metadata field, or `None` when absent.
    pub fn meta(&self, key: &str) -> Option<serde_json::Value> {
        self.metadata.as_ref().and_then(|m| m.get(key).cloned())
    }
}

/// Anything that can answer a vector query. Tests substitute a fake.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn query(&self, request: QueryRequest) -> Result<Vec<VectorMatch>, VectorError>;

    /// Insert or replace one document.
    async fn upsert(&self, record: UpsertRecord) -> Result<(), VectorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum VectorError {
    #[error("vector request failed: {0}")]
    Network(String),

    #[error("vector index returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("unexpected vector response: {0}")]
    Decode(String),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Vec<VectorMatch>,
}

/// REST client for an Upstash Vector index.
pub struct UpstashVectorClient {
    url: String,
    token: String,
    client: reqwest::Client,
}

impl UpstashVectorClient {
    pub fn new(url: impl Into<String>, token: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client,
        }
    }

    /// Build from config; `None` unless both URL and token are set.
    pub fn from_config(config: &VectorConfig, client: reqwest::Client) -> Option<Self> {
        match (&config.url, &config.token) {
            (Some(url), Some(token)) => Some(Self::new(url, token, client)),
            _ => None,
        }
    }
}

#[async_trait]
impl VectorIndex for UpstashVectorClient {
    async fn query(&self, request: QueryRequest) -> Result<Vec<VectorMatch>, VectorError> {
        debug!(top_k = request.top_k, filter = ?request.filter, "Querying vector index");

        let response = self
            .client
            .post(format!("{}/query-data", self.url))
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| VectorError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VectorError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| VectorError::Decode(e.to_string()))?;
        Ok(parsed.result)
    }

    async fn upsert(&self, record: UpsertRecord) -> Result<(), VectorError> {
        debug!(id = %record.id, "Upserting into vector index");

        let response = self
            .client
            .post(format!("{}/upsert-data", self.url))
            .bearer_auth(&self.token)
            .json(&record)
            .send()
            .await
            .map_err(|e| VectorError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VectorError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
