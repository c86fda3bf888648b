//! Search Engine Wire Types
//!
//! The subset of the Elasticsearch REST API this service reads. Request bodies are built
//! as `serde_json::Value` in [`elastic`](super::elastic); only responses need types.

use serde::{Deserialize, Serialize};

/// Path suffix of the search API (`/{index}/_search`).
pub const ENDPOINT_SEARCH: &str = "_search";

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: HitsEnvelope,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HitsEnvelope {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
}
