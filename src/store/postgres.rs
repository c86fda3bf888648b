use super::RecordStore;
use super::types::{Record, RecordId, StoreError};

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

const SELECT_PRODUCT: &str = "SELECT id, name, raw_data FROM products WHERE id = $1";
const SELECT_PRODUCTS: &str = "SELECT id, name, raw_data FROM products WHERE id = ANY($1)";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: Option<String>,
    raw_data: Option<serde_json::Value>,
}

impl ProductRow {
    fn into_record(self) -> Record {
        Record {
            id: RecordId(self.id.to_string()),
            name: self.name.unwrap_or_default(),
            attributes: self.raw_data.unwrap_or(serde_json::Value::Null),
        }
    }
}

/// Record store over the gateway's `products` table.
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool and checks that the database answers.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(timeout)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        tracing::info!("Connected to product database ({} connections max)", max_connections);
        Ok(Self { pool })
    }

    /// Builds a pool without connecting; connections are opened on first use.
    pub fn connect_lazy(
        database_url: &str,
        max_connections: u32,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(timeout)
            .connect_lazy(database_url)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn get_by_id(&self, id: &RecordId) -> Result<Record, StoreError> {
        // Non-UUID keys cannot exist in the table.
        let Ok(uuid) = Uuid::parse_str(id.as_str()) else {
            tracing::debug!("Record id {} is not a UUID", id);
            return Err(StoreError::NotFound(id.clone()));
        };

        let row = sqlx::query_as::<_, ProductRow>(SELECT_PRODUCT)
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        row.map(ProductRow::into_record)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn get_many(&self, ids: &[RecordId]) -> Result<Vec<Option<Record>>, StoreError> {
        let parsed: Vec<Option<Uuid>> = ids
            .iter()
            .map(|id| Uuid::parse_str(id.as_str()).ok())
            .collect();
        let wanted: Vec<Uuid> = parsed.iter().flatten().copied().collect();

        if wanted.is_empty() {
            return Ok(vec![None; ids.len()]);
        }

        let rows = sqlx::query_as::<_, ProductRow>(SELECT_PRODUCTS)
            .bind(&wanted[..])
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let by_id: HashMap<Uuid, Record> = rows
            .into_iter()
            .map(|row| (row.id, row.into_record()))
            .collect();

        Ok(parsed
            .into_iter()
            .map(|uuid| uuid.and_then(|u| by_id.get(&u).cloned()))
            .collect())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
