use super::errors::SearchError;
use crate::store::types::Record;

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Body of `POST /products/search`.
///
/// Both fields are optional on the wire so that a missing value is reported as an
/// invalid query rather than a deserialization failure.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default, alias = "text")]
    pub query: Option<String>,
    #[serde(default, alias = "limit")]
    pub cnt: Option<i64>,
}

/// Query string of `GET /search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

impl From<SearchParams> for SearchRequest {
    fn from(params: SearchParams) -> Self {
        Self {
            query: params.q,
            cnt: params.limit,
        }
    }
}

/// A validated search query: trimmed, non-blank text and a limit within `1..=max`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    limit: usize,
}

impl SearchQuery {
    pub fn new(text: &str, limit: i64, max_limit: usize) -> Result<Self, SearchError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SearchError::invalid("query text must not be blank"));
        }
        if limit < 1 {
            return Err(SearchError::invalid(format!(
                "limit must be at least 1, got {}",
                limit
            )));
        }
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        if limit > max_limit {
            return Err(SearchError::invalid(format!(
                "limit must be at most {}, got {}",
                max_limit, limit
            )));
        }

        Ok(Self {
            text: text.to_string(),
            limit,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

/// Hydrated records in the index's ranking order.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub items: Vec<Record>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Error payload returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(kind: &str, message: &impl Display) -> Self {
        Self {
            error: kind.to_string(),
            message: message.to_string(),
        }
    }
}
