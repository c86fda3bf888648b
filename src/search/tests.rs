//! Search Module Tests
//!
//! Validates the aggregation pipeline against fake backends that count their calls.
//!
//! ## Test Scopes
//! - **Validation**: Blank text and bad limits fail before any backend is touched.
//! - **Ordering**: Results come back in exactly the index's order, in both lookup modes.
//! - **Failures**: Divergence, index outages and store outages surface as typed errors.
//! - **Handlers & wire types**: HTTP mapping and JSON shape.

#[cfg(test)]
mod tests {
    use crate::config::types::SearchSettings;
    use crate::index::TextIndex;
    use crate::index::analyzer::{Analyzer, SynonymTable};
    use crate::index::memory::MemoryIndex;
    use crate::index::types::{IndexDocument, IndexError, RankedReference};
    use crate::search::aggregator::Aggregator;
    use crate::search::errors::SearchError;
    use crate::search::handlers::{handle_search, handle_search_products};
    use crate::search::types::{ResultSet, SearchParams, SearchQuery, SearchRequest};
    use crate::store::RecordStore;
    use crate::store::memory::MemoryStore;
    use crate::store::types::{Record, RecordId, StoreError};
    use async_trait::async_trait;
    use axum::extract::{Extension, Query};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::Json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ============================================================
    // FAKES
    // ============================================================

    #[derive(Default)]
    struct FakeIndex {
        ids: Vec<&'static str>,
        down: bool,
        calls: AtomicUsize,
        last_limit: AtomicUsize,
    }

    impl FakeIndex {
        fn returning(ids: &[&'static str]) -> Self {
            Self {
                ids: ids.to_vec(),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl TextIndex for FakeIndex {
        async fn lookup(&self, _text: &str, limit: usize) -> Result<Vec<RankedReference>, IndexError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.last_limit.store(limit, Ordering::SeqCst);
            if self.down {
                return Err(IndexError::Transport("connection refused".to_string()));
            }
            // Deliberately ignores `limit`, so the aggregator's own cap is observable.
            Ok(RankedReference::from_ordered(self.ids.iter().copied()))
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        down: bool,
        single_calls: AtomicUsize,
        batch_calls: AtomicUsize,
    }

    impl CountingStore {
        fn holding(ids: &[&str]) -> Self {
            Self {
                inner: MemoryStore::from_records(ids.iter().map(|id| record(id))),
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.single_calls.load(Ordering::SeqCst) + self.batch_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RecordStore for CountingStore {
        async fn get_by_id(&self, id: &RecordId) -> Result<Record, StoreError> {
            self.single_calls.fetch_add(1, Ordering::SeqCst);
            if self.down {
                return Err(StoreError::Unavailable("pool timed out".to_string()));
            }
            self.inner.get_by_id(id).await
        }

        async fn get_many(&self, ids: &[RecordId]) -> Result<Vec<Option<Record>>, StoreError> {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            if self.down {
                return Err(StoreError::Unavailable("pool timed out".to_string()));
            }
            self.inner.get_many(ids).await
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    /// Store whose multi-get loses a slot.
    struct ShortBatchStore;

    #[async_trait]
    impl RecordStore for ShortBatchStore {
        async fn get_by_id(&self, id: &RecordId) -> Result<Record, StoreError> {
            Ok(record(id.as_str()))
        }

        async fn get_many(&self, ids: &[RecordId]) -> Result<Vec<Option<Record>>, StoreError> {
            Ok(ids
                .iter()
                .skip(1)
                .map(|id| Some(record(id.as_str())))
                .collect())
        }

        fn name(&self) -> &'static str {
            "short"
        }
    }

    fn record(id: &str) -> Record {
        Record {
            id: RecordId::from(id),
            name: format!("Product {}", id),
            attributes: serde_json::json!({ "id": id, "price": 1999.0, "currency": "RUB" }),
        }
    }

    fn settings(batch_lookup: bool) -> SearchSettings {
        SearchSettings {
            max_limit: 20,
            default_limit: 5,
            batch_lookup,
        }
    }

    fn aggregator(
        index: &Arc<FakeIndex>,
        store: &Arc<CountingStore>,
        batch_lookup: bool,
    ) -> Aggregator {
        Aggregator::new(index.clone(), store.clone(), settings(batch_lookup))
    }

    fn query(text: &str, limit: i64) -> SearchQuery {
        SearchQuery::new(text, limit, 20).unwrap()
    }

    fn ids(results: &ResultSet) -> Vec<&str> {
        results.items.iter().map(|r| r.id.as_str()).collect()
    }

    // ============================================================
    // QUERY VALIDATION
    // ============================================================

    #[test]
    fn test_query_trims_text() {
        let q = SearchQuery::new("  laptop  ", 3, 20).unwrap();
        assert_eq!(q.text(), "laptop");
        assert_eq!(q.limit(), 3);
    }

    #[test]
    fn test_query_rejects_blank_text() {
        assert!(matches!(
            SearchQuery::new("", 5, 20),
            Err(SearchError::InvalidQuery { .. })
        ));
        assert!(matches!(
            SearchQuery::new(" \t\n", 5, 20),
            Err(SearchError::InvalidQuery { .. })
        ));
    }

    #[test]
    fn test_query_limit_bounds() {
        assert!(SearchQuery::new("laptop", 0, 20).is_err());
        assert!(SearchQuery::new("laptop", -3, 20).is_err());
        assert!(SearchQuery::new("laptop", 21, 20).is_err());
        assert!(SearchQuery::new("laptop", i64::MAX, 20).is_err());
        assert_eq!(SearchQuery::new("laptop", 1, 20).unwrap().limit(), 1);
        assert_eq!(SearchQuery::new("laptop", 20, 20).unwrap().limit(), 20);
    }

    #[tokio::test]
    async fn test_blank_query_makes_no_backend_calls() {
        let index = Arc::new(FakeIndex::returning(&["id1"]));
        let store = Arc::new(CountingStore::holding(&["id1"]));
        let aggregator = aggregator(&index, &store, false);

        let result = aggregator
            .search_request(SearchRequest {
                query: Some(String::new()),
                cnt: Some(5),
            })
            .await;

        assert!(matches!(result, Err(SearchError::InvalidQuery { .. })));
        assert_eq!(index.calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_bad_limits_make_no_backend_calls() {
        let index = Arc::new(FakeIndex::returning(&["id1"]));
        let store = Arc::new(CountingStore::holding(&["id1"]));
        let aggregator = aggregator(&index, &store, false);

        for cnt in [0, -1, 21] {
            let result = aggregator
                .search_request(SearchRequest {
                    query: Some("laptop".to_string()),
                    cnt: Some(cnt),
                })
                .await;
            assert!(
                matches!(result, Err(SearchError::InvalidQuery { .. })),
                "cnt {} should be rejected",
                cnt
            );
        }

        assert_eq!(index.calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_search_rechecks_limit_against_settings() {
        let index = Arc::new(FakeIndex::returning(&["id1"]));
        let store = Arc::new(CountingStore::holding(&["id1"]));
        let aggregator = aggregator(&index, &store, false);

        // Valid under a looser maximum, but not under this aggregator's.
        let loose = SearchQuery::new("laptop", 50, 100).unwrap();

        assert!(matches!(
            aggregator.search(&loose).await,
            Err(SearchError::InvalidQuery { .. })
        ));
        assert_eq!(index.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_fields_in_request() {
        let index = Arc::new(FakeIndex::returning(&["id1"]));
        let store = Arc::new(CountingStore::holding(&["id1"]));
        let aggregator = aggregator(&index, &store, false);

        assert!(aggregator.parse_request(SearchRequest::default()).is_err());

        let defaulted = aggregator
            .parse_request(SearchRequest {
                query: Some("laptop".to_string()),
                cnt: None,
            })
            .unwrap();
        assert_eq!(defaulted.limit(), 5);
    }

    // ============================================================
    // ORDERING
    // ============================================================

    #[tokio::test]
    async fn test_laptop_scenario_keeps_index_order() {
        let index = Arc::new(FakeIndex::returning(&["id7", "id2", "id9"]));
        let store = Arc::new(CountingStore::holding(&["id2", "id7", "id9"]));
        let aggregator = aggregator(&index, &store, false);

        let results = aggregator.search(&query("laptop", 3)).await.unwrap();

        assert_eq!(ids(&results), vec!["id7", "id2", "id9"]);
        assert_eq!(results.items[0], record("id7"));
        assert_eq!(index.last_limit.load(Ordering::SeqCst), 3);
        assert_eq!(store.single_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_batched_lookup_keeps_index_order() {
        let index = Arc::new(FakeIndex::returning(&["id7", "id2", "id9"]));
        let store = Arc::new(CountingStore::holding(&["id2", "id7", "id9"]));
        let aggregator = aggregator(&index, &store, true);

        let results = aggregator.search(&query("laptop", 3)).await.unwrap();

        assert_eq!(ids(&results), vec!["id7", "id2", "id9"]);
        assert_eq!(store.batch_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.single_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_ranking_is_empty_result() {
        let index = Arc::new(FakeIndex::returning(&[]));
        let store = Arc::new(CountingStore::holding(&["id1"]));

        for batch in [false, true] {
            let aggregator = aggregator(&index, &store, batch);
            let results = aggregator.search(&query("nothing matches", 5)).await.unwrap();
            assert!(results.is_empty());
        }

        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_oversized_ranking_is_capped_at_limit() {
        let index = Arc::new(FakeIndex::returning(&["a", "b", "c", "d", "e"]));
        let store = Arc::new(CountingStore::holding(&["a", "b", "c", "d", "e"]));
        let aggregator = aggregator(&index, &store, false);

        let results = aggregator.search(&query("phone", 2)).await.unwrap();

        assert_eq!(ids(&results), vec!["a", "b"]);
        assert_eq!(store.single_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_search_is_idempotent() {
        let index = Arc::new(FakeIndex::returning(&["id3", "id1", "id2"]));
        let store = Arc::new(CountingStore::holding(&["id1", "id2", "id3"]));

        for batch in [false, true] {
            let aggregator = aggregator(&index, &store, batch);
            let first = aggregator.search(&query("tv", 10)).await.unwrap();
            let second = aggregator.search(&query("tv", 10)).await.unwrap();
            assert_eq!(first, second);
        }
    }

    // ============================================================
    // FAILURES
    // ============================================================

    #[tokio::test]
    async fn test_missing_record_fails_fast() {
        let index = Arc::new(FakeIndex::returning(&["id1", "ghost", "id2"]));
        let store = Arc::new(CountingStore::holding(&["id1", "id2"]));
        let aggregator = aggregator(&index, &store, false);

        let err = aggregator.search(&query("laptop", 3)).await.unwrap_err();

        match err {
            SearchError::ResolutionFailure { id, rank, source } => {
                assert_eq!(id, RecordId::from("ghost"));
                assert_eq!(rank, 1);
                assert!(source.is_not_found());
            }
            other => panic!("expected resolution failure, got {:?}", other),
        }
        // Stopped at the gap; "id2" was never looked up.
        assert_eq!(store.single_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_record_fails_in_batched_mode() {
        let index = Arc::new(FakeIndex::returning(&["id1", "id2", "ghost"]));
        let store = Arc::new(CountingStore::holding(&["id1", "id2"]));
        let aggregator = aggregator(&index, &store, true);

        let err = aggregator.search(&query("laptop", 3)).await.unwrap_err();

        assert!(matches!(
            err,
            SearchError::ResolutionFailure { ref id, rank: 2, .. } if id.as_str() == "ghost"
        ));
    }

    #[tokio::test]
    async fn test_index_outage_is_index_unavailable() {
        let index = Arc::new(FakeIndex {
            down: true,
            ..FakeIndex::default()
        });
        let store = Arc::new(CountingStore::holding(&["id1"]));
        let aggregator = aggregator(&index, &store, false);

        let err = aggregator.search(&query("laptop", 3)).await.unwrap_err();

        assert!(matches!(err, SearchError::IndexUnavailable(IndexError::Transport(_))));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_store_outage_is_store_unavailable() {
        let index = Arc::new(FakeIndex::returning(&["id1"]));
        let store = Arc::new(CountingStore {
            down: true,
            ..CountingStore::default()
        });

        for batch in [false, true] {
            let aggregator = aggregator(&index, &store, batch);
            let err = aggregator.search(&query("laptop", 3)).await.unwrap_err();
            assert!(matches!(err, SearchError::StoreUnavailable(_)));
        }
    }

    #[tokio::test]
    async fn test_batched_slot_mismatch_is_store_unavailable() {
        let index = Arc::new(FakeIndex::returning(&["id1", "id2"]));
        let aggregator = Aggregator::new(index, Arc::new(ShortBatchStore), settings(true));

        let err = aggregator.search(&query("laptop", 2)).await.unwrap_err();

        match err {
            SearchError::StoreUnavailable(StoreError::Unavailable(message)) => {
                assert!(message.contains("1 slots for 2 identifiers"))
            }
            other => panic!("expected store unavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_error_http_mapping() {
        let cases = [
            (SearchError::invalid("blank"), StatusCode::BAD_REQUEST, "invalid_query"),
            (
                SearchError::IndexUnavailable(IndexError::Transport("down".to_string())),
                StatusCode::SERVICE_UNAVAILABLE,
                "index_unavailable",
            ),
            (
                SearchError::ResolutionFailure {
                    id: RecordId::from("ghost"),
                    rank: 0,
                    source: StoreError::NotFound(RecordId::from("ghost")),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
                "resolution_failure",
            ),
            (
                SearchError::StoreUnavailable(StoreError::Unavailable("down".to_string())),
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
            ),
        ];

        for (error, status, kind) in cases {
            assert_eq!(error.status_code(), status);
            assert_eq!(error.kind(), kind);
            assert_eq!(error.into_response().status(), status);
        }
    }

    // ============================================================
    // HANDLERS
    // ============================================================

    #[tokio::test]
    async fn test_handle_search_products_returns_items() {
        let index = Arc::new(FakeIndex::returning(&["id7", "id2"]));
        let store = Arc::new(CountingStore::holding(&["id2", "id7"]));
        let aggregator = Arc::new(aggregator(&index, &store, false));

        let request = SearchRequest {
            query: Some("laptop".to_string()),
            cnt: Some(2),
        };
        let Json(results) = handle_search_products(Extension(aggregator), Ok(Json(request)))
            .await
            .unwrap();

        assert_eq!(ids(&results), vec!["id7", "id2"]);
    }

    #[tokio::test]
    async fn test_handle_search_query_string_uses_default_limit() {
        let index = Arc::new(FakeIndex::returning(&["id1"]));
        let store = Arc::new(CountingStore::holding(&["id1"]));
        let aggregator = Arc::new(aggregator(&index, &store, false));

        let params = SearchParams {
            q: Some("phone".to_string()),
            limit: None,
        };
        let Json(results) = handle_search(Extension(aggregator), Ok(Query(params)))
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(index.last_limit.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_handle_search_reports_invalid_query() {
        let index = Arc::new(FakeIndex::returning(&["id1"]));
        let store = Arc::new(CountingStore::holding(&["id1"]));
        let aggregator = Arc::new(aggregator(&index, &store, false));

        let params = SearchParams {
            q: Some("   ".to_string()),
            limit: Some(3),
        };
        let err = handle_search(Extension(aggregator), Ok(Query(params)))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    // ============================================================
    // END TO END WITH IN-PROCESS BACKENDS
    // ============================================================

    #[tokio::test]
    async fn test_memory_backends_end_to_end() {
        let index = MemoryIndex::new(
            Analyzer::new(vec!["для".to_string()], SynonymTable::parse("ноутбук, laptop")),
            3.0,
        );
        index.add(IndexDocument {
            id: "id7".to_string(),
            name: "Ноутбук игровой".to_string(),
            text: "для игр".to_string(),
            tags: vec![],
        });
        index.add(IndexDocument {
            id: "id2".to_string(),
            name: "Сумка".to_string(),
            text: "для ноутбука и laptop".to_string(),
            tags: vec![],
        });
        let store = MemoryStore::from_records(vec![record("id7"), record("id2")]);

        let aggregator = Aggregator::new(Arc::new(index), Arc::new(store), settings(false));
        let results = aggregator.search(&query("Laptop", 5)).await.unwrap();

        assert_eq!(ids(&results), vec!["id7", "id2"]);
    }

    // ============================================================
    // WIRE TYPES
    // ============================================================

    #[test]
    fn test_search_request_accepts_aliases() {
        let original: SearchRequest =
            serde_json::from_str(r#"{"query": "laptop", "cnt": 3}"#).unwrap();
        let aliased: SearchRequest =
            serde_json::from_str(r#"{"text": "laptop", "limit": 3}"#).unwrap();
        let negative: SearchRequest = serde_json::from_str(r#"{"query": "x", "cnt": -1}"#).unwrap();

        assert_eq!(original.query.as_deref(), Some("laptop"));
        assert_eq!(aliased.cnt, Some(3));
        assert_eq!(negative.cnt, Some(-1));
    }

    #[test]
    fn test_result_set_serialization() {
        let results = ResultSet {
            items: vec![record("id7")],
        };

        let json = serde_json::to_value(&results).unwrap();

        assert_eq!(json["items"][0]["id"], "id7");
        assert_eq!(json["items"][0]["name"], "Product id7");
        assert_eq!(json["items"][0]["dataRow"]["currency"], "RUB");
    }
}
