//! Record Store Module
//!
//! The store of truth for catalog records. The search path only ever reads from it.
//!
//! ## Backends
//! - **`postgres`**: The `products` table (`id`, `name`, `raw_data` JSONB) via a sqlx pool.
//! - **`remote`**: Another gateway instance, reached over its `/products/:id` endpoint.
//! - **`memory`**: A concurrent in-process map, used for local development and tests.
//!
//! All backends sit behind the [`RecordStore`] trait, so the aggregator never knows which
//! one it is talking to.

pub mod handlers;
pub mod memory;
pub mod postgres;
pub mod protocol;
pub mod remote;
pub mod types;


use async_trait::async_trait;
use types::{Record, RecordId, StoreError};

/// Read access to canonical records by identifier.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Looks up a single record.
    ///
    /// Returns [`StoreError::NotFound`] when the store is healthy but has no such record,
    /// and [`StoreError::Unavailable`] for anything transport-related.
    async fn get_by_id(&self, id: &RecordId) -> Result<Record, StoreError>;

    /// Looks up several records at once.
    ///
    /// The output has exactly one slot per requested identifier, in request order;
    /// `None` marks a missing record. Backends with a native multi-get override this.
    async fn get_many(&self, ids: &[RecordId]) -> Result<Vec<Option<Record>>, StoreError> {
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get_by_id(id).await {
                Ok(record) => records.push(Some(record)),
                Err(StoreError::NotFound(_)) => records.push(None),
                Err(e) => return Err(e),
            }
        }
        Ok(records)
    }

    /// Short backend label used in logs.
    fn name(&self) -> &'static str;
}
