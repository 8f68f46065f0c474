//! SOUS Graph - Record store implementations
//!
//! Provides the SurrealDB graph store holding ingredients and their tokens,
//! plus an in-memory store for development and tests.
//!
//! Author: sous maintainers

pub mod memory;
pub mod surrealdb_store;

use std::sync::Arc;

pub use memory::InMemoryRecordStore;
pub use surrealdb_store::SurrealRecordStore;

use sous_core::{DatabaseConfig, RecordStore, Result, StoreBackend};

/// Build the record store selected in the database configuration
pub async fn build_store(config: &DatabaseConfig) -> Result<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match config.backend {
        StoreBackend::SurrealDb => Arc::new(SurrealRecordStore::new(config).await?),
        StoreBackend::Memory => match &config.seed_path {
            Some(path) => Arc::new(InMemoryRecordStore::load_json(path)?),
            None => Arc::new(InMemoryRecordStore::new()),
        },
    };
    tracing::info!("Using {} record store", store.name());
    Ok(store)
}
