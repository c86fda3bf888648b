use super::RecordStore;
use super::types::{Record, RecordId, StoreError};
use crate::search::types::ErrorBody;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
};
use std::sync::Arc;

pub async fn handle_get_product(
    Extension(store): Extension<Arc<dyn RecordStore>>,
    Path(id): Path<String>,
) -> Result<Json<Record>, (StatusCode, Json<ErrorBody>)> {
    let id = RecordId(id);

    match store.get_by_id(&id).await {
        Ok(record) => Ok(Json(record)),
        Err(e @ StoreError::NotFound(_)) => {
            tracing::debug!("Product lookup miss: {}", id);
            Err((StatusCode::NOT_FOUND, Json(ErrorBody::new("not_found", &e))))
        }
        Err(e @ StoreError::Unavailable(_)) => {
            tracing::error!("Product lookup for {} failed on {}: {}", id, store.name(), e);
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorBody::new("store_unavailable", &e)),
            ))
        }
    }
}
