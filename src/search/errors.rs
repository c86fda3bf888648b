use super::types::ErrorBody;
use crate::index::types::IndexError;
use crate::store::types::{RecordId, StoreError};

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Everything a search call can fail with. None of these are retried here.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The caller's query breaks the text/limit rules. Raised before any backend is called.
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    /// Ranking could not be obtained.
    #[error("text index unavailable: {0}")]
    IndexUnavailable(#[source] IndexError),

    /// The index ranked an identifier that the record store does not have.
    #[error("index returned {id} at rank {rank}, which the record store cannot resolve")]
    ResolutionFailure {
        id: RecordId,
        rank: usize,
        #[source]
        source: StoreError,
    },

    /// Records could not be read.
    #[error("record store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),
}

impl SearchError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        SearchError::InvalidQuery {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::InvalidQuery { .. } => "invalid_query",
            SearchError::IndexUnavailable(_) => "index_unavailable",
            SearchError::ResolutionFailure { .. } => "resolution_failure",
            SearchError::StoreUnavailable(_) => "store_unavailable",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            SearchError::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
            SearchError::IndexUnavailable(_) | SearchError::StoreUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            SearchError::ResolutionFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorBody::new(self.kind(), &self))).into_response()
    }
}
