use super::aggregator::Aggregator;
use super::errors::SearchError;
use super::types::{ResultSet, SearchParams, SearchRequest};

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Extension, Query};
use axum::Json;
use serde_json::{Value, json};
use std::sync::Arc;

/// `POST /products/search` with a `{"query": ..., "cnt": ...}` body.
pub async fn handle_search_products(
    Extension(aggregator): Extension<Arc<Aggregator>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<ResultSet>, SearchError> {
    let Json(request) = payload.map_err(|e| SearchError::invalid(e.body_text()))?;
    run_search(&aggregator, request).await
}

/// `GET /search?q=...&limit=...`
pub async fn handle_search(
    Extension(aggregator): Extension<Arc<Aggregator>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<ResultSet>, SearchError> {
    let Query(params) = params.map_err(|e| SearchError::invalid(e.body_text()))?;
    run_search(&aggregator, params.into()).await
}

pub async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn run_search(
    aggregator: &Aggregator,
    request: SearchRequest,
) -> Result<Json<ResultSet>, SearchError> {
    match aggregator.search_request(request).await {
        Ok(results) => {
            tracing::debug!("Search answered with {} products", results.len());
            Ok(Json(results))
        }
        Err(e) => {
            if let SearchError::InvalidQuery { reason } = &e {
                tracing::debug!("Rejected search: {}", reason);
            }
            Err(e)
        }
    }
}
