use crate::store::types::RecordId;
use serde::{Deserialize, Serialize};

/// An identifier and its position in a relevance ordering.
///
/// Only lives for the duration of one aggregation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedReference {
    pub id: RecordId,
    /// 0-based position in the index's result order.
    pub rank: usize,
}

impl RankedReference {
    /// Numbers identifiers by their position in `ids`.
    pub fn from_ordered<I>(ids: I) -> Vec<Self>
    where
        I: IntoIterator,
        I::Item: Into<RecordId>,
    {
        ids.into_iter()
            .enumerate()
            .map(|(rank, id)| Self {
                id: id.into(),
                rank,
            })
            .collect()
    }
}

/// A document as submitted to the full-text index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexDocument {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Failures talking to the text index. All of them mean "ranking is unavailable".
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("search engine unreachable: {0}")]
    Transport(String),

    #[error("search engine answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unreadable search engine response: {0}")]
    Decode(String),
}
