use super::RecordStore;
use super::protocol::ENDPOINT_PRODUCTS;
use super::types::{Record, RecordId, StoreError};

use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

/// Record store that reads from another gateway's product endpoint.
///
/// One request per lookup, bounded by `timeout`. Nothing is retried here; a failed
/// request surfaces as [`StoreError::Unavailable`].
pub struct HttpRecordStore {
    http_client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpRecordStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| StoreError::Unavailable(format!("invalid record service url: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Unavailable(format!(
                "invalid record service url: {}",
                base_url
            )));
        }

        Ok(Self {
            http_client: reqwest::Client::new(),
            base_url,
            timeout,
        })
    }

    fn product_url(&self, id: &RecordId) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(ENDPOINT_PRODUCTS.trim_start_matches('/'))
                .push(id.as_str());
        }
        url
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn get_by_id(&self, id: &RecordId) -> Result<Record, StoreError> {
        let url = self.product_url(id);

        let response = self
            .http_client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.clone()));
        }
        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "record service answered {}",
                response.status()
            )));
        }

        response
            .json::<Record>()
            .await
            .map_err(|e| StoreError::Unavailable(format!("malformed record {}: {}", id, e)))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
