//! Application state management
//!
//! Everything the handlers need is built once at startup and shared as
//! `Arc<AppState>`.
//!
//! Author: sous maintainers

use crate::render::PageRenderer;
use sous_core::config::AppConfig;
use sous_core::{Predictor, RecordStore, Result};
use sous_tagger::LabelExtractor;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
    /// Labels submitted since start
    pub submission_count: AtomicU64,
    /// Ready status
    pub is_ready: AtomicBool,
    /// Ingredient record store
    pub store: Arc<dyn RecordStore>,
    /// NER model
    pub predictor: Arc<dyn Predictor>,
    /// HTML page renderer
    pub renderer: PageRenderer,
    /// Label field extractor for submitted forms
    pub extractor: LabelExtractor,
}

impl AppState {
    /// Create application state from config and collaborators
    pub fn new(
        config: AppConfig,
        store: Arc<dyn RecordStore>,
        predictor: Arc<dyn Predictor>,
    ) -> Result<Self> {
        let extractor = LabelExtractor::new(config.labeling.index_ordering);
        Ok(Self {
            config,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            submission_count: AtomicU64::new(0),
            is_ready: AtomicBool::new(true),
            store,
            predictor,
            renderer: PageRenderer::new()?,
            extractor,
        })
    }

    /// Connect the store and predictor named in the configuration
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        let store = sous_graph::build_store(&config.database).await?;
        let predictor = sous_tagger::build_predictor(&config.model)?;
        Self::new(config, store, predictor)
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Increment submission counter
    pub fn increment_submissions(&self) -> u64 {
        self.submission_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total submission count
    pub fn get_submission_count(&self) -> u64 {
        self.submission_count.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Check if service is ready
    pub fn is_ready(&self) -> bool {
        self.is_ready.load(Ordering::SeqCst)
    }

    /// Set ready status; cleared on shutdown
    pub fn set_ready(&self, ready: bool) {
        self.is_ready.store(ready, Ordering::SeqCst);
    }
}
