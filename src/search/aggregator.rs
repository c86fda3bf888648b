use super::errors::SearchError;
use super::types::{ResultSet, SearchQuery, SearchRequest};
use crate::config::types::SearchSettings;
use crate::index::TextIndex;
use crate::index::types::RankedReference;
use crate::store::RecordStore;
use crate::store::types::{Record, StoreError};

use std::sync::Arc;

/// Fans a query out to the text index and hydrates the ranked identifiers from the
/// record store.
///
/// Missing records are fatal: the first identifier the store cannot resolve aborts the
/// whole call with [`SearchError::ResolutionFailure`]. A gap means the index and the
/// store have diverged, and the caller gets to see that instead of a shortened list.
pub struct Aggregator {
    index: Arc<dyn TextIndex>,
    store: Arc<dyn RecordStore>,
    settings: SearchSettings,
}

impl Aggregator {
    pub fn new(
        index: Arc<dyn TextIndex>,
        store: Arc<dyn RecordStore>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            index,
            store,
            settings,
        }
    }

    /// Validates a wire request. A missing count falls back to `default_limit`.
    pub fn parse_request(&self, request: SearchRequest) -> Result<SearchQuery, SearchError> {
        let text = request
            .query
            .ok_or_else(|| SearchError::invalid("query text is required"))?;
        let limit = request
            .cnt
            .unwrap_or(self.settings.default_limit as i64);
        SearchQuery::new(&text, limit, self.settings.max_limit)
    }

    pub async fn search_request(&self, request: SearchRequest) -> Result<ResultSet, SearchError> {
        let query = self.parse_request(request)?;
        self.search(&query).await
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<ResultSet, SearchError> {
        if query.limit() > self.settings.max_limit {
            return Err(SearchError::invalid(format!(
                "limit must be at most {}, got {}",
                self.settings.max_limit,
                query.limit()
            )));
        }

        let mut refs = self
            .index
            .lookup(query.text(), query.limit())
            .await
            .map_err(|e| {
                tracing::error!("Text index {} failed: {}", self.index.name(), e);
                SearchError::IndexUnavailable(e)
            })?;

        if refs.len() > query.limit() {
            tracing::warn!(
                "Text index {} returned {} references for limit {}, dropping the rest",
                self.index.name(),
                refs.len(),
                query.limit()
            );
            refs.truncate(query.limit());
        }

        tracing::debug!(
            "Query {:?} ranked {} references (limit {})",
            query.text(),
            refs.len(),
            query.limit()
        );

        if refs.is_empty() {
            return Ok(ResultSet::default());
        }

        let items = if self.settings.batch_lookup {
            self.hydrate_batched(&refs).await?
        } else {
            self.hydrate_sequential(&refs).await?
        };

        Ok(ResultSet { items })
    }

    async fn hydrate_sequential(&self, refs: &[RankedReference]) -> Result<Vec<Record>, SearchError> {
        let mut items = Vec::with_capacity(refs.len());
        for reference in refs {
            match self.store.get_by_id(&reference.id).await {
                Ok(record) => items.push(record),
                Err(e) => return Err(self.lookup_failure(reference, e)),
            }
        }
        Ok(items)
    }

    async fn hydrate_batched(&self, refs: &[RankedReference]) -> Result<Vec<Record>, SearchError> {
        let ids: Vec<_> = refs.iter().map(|r| r.id.clone()).collect();
        let found = self
            .store
            .get_many(&ids)
            .await
            .map_err(|e| self.store_unavailable(e))?;

        if found.len() != refs.len() {
            return Err(self.store_unavailable(StoreError::Unavailable(format!(
                "multi-get returned {} slots for {} identifiers",
                found.len(),
                refs.len()
            ))));
        }

        let mut items = Vec::with_capacity(refs.len());
        for (reference, record) in refs.iter().zip(found) {
            match record {
                Some(record) => items.push(record),
                None => {
                    let missing = StoreError::NotFound(reference.id.clone());
                    return Err(self.lookup_failure(reference, missing));
                }
            }
        }
        Ok(items)
    }

    fn lookup_failure(&self, reference: &RankedReference, error: StoreError) -> SearchError {
        match error {
            StoreError::NotFound(_) => {
                tracing::error!(
                    "Index/store divergence: {} ranked {} by {} is missing from {}",
                    reference.id,
                    reference.rank,
                    self.index.name(),
                    self.store.name()
                );
                SearchError::ResolutionFailure {
                    id: reference.id.clone(),
                    rank: reference.rank,
                    source: error,
                }
            }
            StoreError::Unavailable(_) => self.store_unavailable(error),
        }
    }

    fn store_unavailable(&self, error: StoreError) -> SearchError {
        tracing::error!("Record store {} failed: {}", self.store.name(), error);
        SearchError::StoreUnavailable(error)
    }
}
