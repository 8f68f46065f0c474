//! In-memory record store
//!
//! Used for local development (seeded from a JSON file) and in tests.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use sous_core::{LabelingStats, Record, RecordStore, Result, SousError};
use tokio::sync::RwLock;

/// Record store holding everything in a map
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<String, Record>>,
}

impl InMemoryRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `records`
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let records = records
            .into_iter()
            .map(|mut r| {
                r.tokens.sort_by_key(|t| t.index);
                (r.id.clone(), r)
            })
            .collect();

        Self {
            records: RwLock::new(records),
        }
    }

    /// Load records from a JSON array file
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SousError::DatabaseError(format!("Failed to read {}: {e}", path.display()))
        })?;
        let records: Vec<Record> = serde_json::from_str(&content).map_err(|e| {
            SousError::DatabaseError(format!("Failed to parse {}: {e}", path.display()))
        })?;

        tracing::info!("Loaded {} records from {}", records.len(), path.display());
        Ok(Self::with_records(records))
    }

    /// Add or replace a record
    pub async fn insert(&self, record: Record) {
        self.records.write().await.insert(record.id.clone(), record);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn fetch_unlabeled(&self, limit: usize) -> Result<Vec<Record>> {
        let records = self.records.read().await;
        let mut unlabeled: Vec<Record> = records
            .values()
            .filter(|r| !r.labelling_done)
            .cloned()
            .collect();

        unlabeled.shuffle(&mut rand::thread_rng());
        unlabeled.truncate(limit);
        Ok(unlabeled)
    }

    async fn persist_labels(&self, record_id: &str, labels: &[String]) -> Result<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(record_id)
            .ok_or_else(|| SousError::NotFound(record_id.to_string()))?;

        record.apply_labels(labels)
    }

    async fn get_record(&self, record_id: &str) -> Result<Option<Record>> {
        Ok(self.records.read().await.get(record_id).cloned())
    }

    async fn stats(&self) -> Result<LabelingStats> {
        let records = self.records.read().await;
        let labeled = records.values().filter(|r| r.labelling_done).count() as u64;
        let total = records.len() as u64;

        Ok(LabelingStats {
            total,
            labeled,
            pending: total - labeled,
        })
    }

    fn name(&self) -> &str {
        "memory"
    }
}
