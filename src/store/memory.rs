use super::RecordStore;
use super::types::{Record, RecordId, StoreError};

use anyhow::{Context, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use std::path::Path;

/// In-process record store backed by a concurrent map.
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<RecordId, Record>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Builds a store from a JSON array of product objects.
    ///
    /// Every object needs a string `id`; `name` is optional. The whole object is kept
    /// as the record's attribute payload, matching what the relational store holds in
    /// its `raw_data` column.
    pub fn load_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading product seed {}", path.display()))?;
        let items: Vec<serde_json::Value> = serde_json::from_str(&text)
            .with_context(|| format!("parsing product seed {}", path.display()))?;

        let store = Self::new();
        for item in items {
            match record_from_json(item) {
                Some(record) => store.insert(record),
                None => tracing::warn!("Skipping seed product without a string id"),
            }
        }

        tracing::info!("Loaded {} products from {}", store.len(), path.display());
        Ok(store)
    }

    pub fn insert(&self, record: Record) {
        self.records.insert(record.id.clone(), record);
    }

    pub fn remove(&self, id: &RecordId) -> Option<Record> {
        self.records.remove(id).map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub(crate) fn record_from_json(item: serde_json::Value) -> Option<Record> {
    let id = item.get("id")?.as_str()?.to_string();
    let name = item
        .get("name")
        .and_then(|n| n.as_str())
        .unwrap_or_default()
        .to_string();

    Some(Record {
        id: RecordId(id),
        name,
        attributes: item,
    })
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_by_id(&self, id: &RecordId) -> Result<Record, StoreError> {
        self.records
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn get_many(&self, ids: &[RecordId]) -> Result<Vec<Option<Record>>, StoreError> {
        Ok(ids
            .iter()
            .map(|id| self.records.get(id).map(|entry| entry.value().clone()))
            .collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
