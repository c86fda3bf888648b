//! Text Index Module
//!
//! Turns free text into an ordered list of matching record identifiers. Relevance is the
//! index's business: the rest of the service only relies on "up to `limit` identifiers,
//! most relevant first".
//!
//! ## Submodules
//! - **`elastic`**: HTTP adapter for an Elasticsearch-compatible engine, plus index creation
//!   from the configured analyzer policy.
//! - **`memory`**: In-process index for development and tests.
//! - **`analyzer`**: Tokenization, stop words and synonyms for the in-process index.
//! - **`protocol`**: Wire types of the engine's search API.
//! - **`types`**: Ranked references, indexable documents, errors.

pub mod analyzer;
pub mod elastic;
pub mod memory;
pub mod protocol;
pub mod types;


use async_trait::async_trait;
use types::{IndexError, RankedReference};

/// Full-text ranking capability.
#[async_trait]
pub trait TextIndex: Send + Sync {
    /// Returns at most `limit` references for `text`, in descending relevance.
    /// `rank` runs from 0 in the returned order.
    async fn lookup(&self, text: &str, limit: usize) -> Result<Vec<RankedReference>, IndexError>;

    /// Short backend label used in logs.
    fn name(&self) -> &'static str;
}
