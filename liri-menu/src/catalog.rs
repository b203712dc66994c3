//! Content API client
//!
//! One GROQ query per section, issued over HTTPS against the hosted content
//! API. This is the only module with network semantics: no batching, no
//! coalescing, no retry. The only timeout is the HTTP client's own.

use crate::model::MenuItemRecord;
use crate::section::SectionConfig;
use async_trait::async_trait;
use liri_common::config::CatalogConfig;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("liri-menu/", env!("CARGO_PKG_VERSION"));

/// Catalog client errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("API error {0}: {1}")]
    Status(u16, String),

    #[error("Malformed response envelope: {0}")]
    Envelope(String),

    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

/// Anything that can produce a section's raw query response
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Raw response envelope (`{"result": [...]}`) for a section
    async fn fetch(&self, section: &SectionConfig) -> Result<Value, CatalogError>;
}

/// GROQ query for a section: type constraint, optional filter clause,
/// ascending `orderRank` and the template's projection
pub fn build_query(section: &SectionConfig) -> String {
    let mut constraint = format!("_type == \"{}\"", section.record_type);
    let mut fields: Vec<&str> = section.template.projection().to_vec();

    if let Some(filter) = &section.filter {
        constraint.push_str(" && ");
        constraint.push_str(&filter.clause());
        if !fields.contains(&filter.field.as_str()) {
            fields.push(&filter.field);
        }
    }

    format!(
        "*[{}] | order(orderRank asc) {{ {} }}",
        constraint,
        fields.join(", ")
    )
}

/// Unwrap the response envelope into records
///
/// A missing or null `result` is an empty list. A `result` that is not a
/// list is a malformed envelope. Individual records that do not match the
/// record shape are skipped with a warning.
pub fn parse_records(payload: &Value) -> Result<Vec<MenuItemRecord>, CatalogError> {
    let envelope = payload
        .as_object()
        .ok_or_else(|| CatalogError::Envelope("response is not a JSON object".to_string()))?;

    let items = match envelope.get("result") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(CatalogError::Envelope(format!(
                "expected result list, got {}",
                json_kind(other)
            )))
        }
    };

    Ok(items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(index, error = %e, "Skipping record with unexpected shape");
                None
            }
        })
        .collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// HTTP client for the hosted content API
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http_client: reqwest::Client,
    query_url: String,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CatalogError::Build(e.to_string()))?;

        Ok(Self {
            http_client,
            query_url: format!(
                "{}/v{}/data/query/{}",
                config.resolved_base_url(),
                config.api_version,
                config.dataset
            ),
        })
    }

    /// Query endpoint, without the query parameter
    pub fn query_url(&self) -> &str {
        &self.query_url
    }

    /// Issue the section's query and return the raw response body
    pub async fn fetch_payload(&self, section: &SectionConfig) -> Result<Value, CatalogError> {
        let query = build_query(section);
        debug!(
            section = %section.name,
            record_type = %section.record_type,
            url = %self.query_url,
            query = %query,
            "Querying content API"
        );

        let response = self
            .http_client
            .get(&self.query_url)
            .query(&[("query", query.as_str())])
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("").to_string();
            return Err(CatalogError::Status(status.as_u16(), reason));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| CatalogError::Envelope(e.to_string()))
    }

    /// Fetch and unwrap a section's records
    pub async fn fetch_records(
        &self,
        section: &SectionConfig,
    ) -> Result<Vec<MenuItemRecord>, CatalogError> {
        let payload = self.fetch_payload(section).await?;
        parse_records(&payload)
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn fetch(&self, section: &SectionConfig) -> Result<Value, CatalogError> {
        self.fetch_payload(section).await
    }
}
