//! SOUS Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout the SOUS system:
//! - Ingredient records and their tokens
//! - Common error types
//! - Capability traits for the NER model and the record store
//! - Configuration management
//!
//! Author: sous maintainers

pub mod config;

pub use config::{
    AppConfig, ConfigError, DatabaseConfig, IndexOrdering, LabelingConfig, LoggingConfig,
    ModelBackend, ModelConfig, ServerConfig, StoreBackend,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for SOUS operations
#[derive(Error, Debug)]
pub enum SousError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record already labeled: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SousError>;

// ============================================================================
// Records and Tokens
// ============================================================================

/// A single token of an ingredient line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Position within the record, fixed at ingestion
    pub index: u32,

    /// Token text
    pub value: String,

    /// Human-reviewed label, absent until the record is labeled
    #[serde(default)]
    pub label: Option<String>,
}

impl Token {
    /// Create an unlabeled token
    pub fn new(index: u32, value: impl Into<String>) -> Self {
        Self {
            index,
            value: value.into(),
            label: None,
        }
    }
}

/// An ingredient record awaiting (or done with) labeling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Record identifier
    pub id: String,

    /// Raw ingredient text
    pub value: String,

    /// Tokens ordered by index
    pub tokens: Vec<Token>,

    /// Set once human labels have been stored
    #[serde(default)]
    pub labelling_done: bool,

    /// When the labels were stored
    #[serde(default)]
    pub labelled_at: Option<DateTime<Utc>>,
}

impl Record {
    /// Create an unlabeled record; tokens are sorted by index
    pub fn new(id: impl Into<String>, value: impl Into<String>, mut tokens: Vec<Token>) -> Self {
        tokens.sort_by_key(|t| t.index);
        Self {
            id: id.into(),
            value: value.into(),
            tokens,
            labelling_done: false,
            labelled_at: None,
        }
    }

    /// Build a record by splitting `value` on whitespace
    pub fn from_text(id: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        let tokens = value
            .split_whitespace()
            .enumerate()
            .map(|(i, word)| Token::new(i as u32, word))
            .collect();
        Self::new(id, value, tokens)
    }

    /// Token texts in index order
    pub fn words(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.value.clone()).collect()
    }

    /// Store human labels on this record.
    ///
    /// Each token receives `labels[token.index]`; tokens whose index is past
    /// the end of `labels` stay unlabeled. Fails with [`SousError::Conflict`]
    /// if the record was already labeled.
    pub fn apply_labels(&mut self, labels: &[String]) -> Result<()> {
        if self.labelling_done {
            return Err(SousError::Conflict(self.id.clone()));
        }

        for token in &mut self.tokens {
            token.label = labels.get(token.index as usize).cloned();
        }
        self.labelling_done = true;
        self.labelled_at = Some(Utc::now());
        Ok(())
    }
}

/// Labeling progress across the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelingStats {
    pub total: u64,
    pub labeled: u64,
    pub pending: u64,
}

impl LabelingStats {
    /// Percentage of records labeled so far
    pub fn completion_rate(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.labeled as f32 / self.total as f32 * 100.0
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Trait for NER models that suggest one label per token
#[async_trait::async_trait]
pub trait Predictor: Send + Sync {
    /// Predict labels for a token sequence; the result has the same length
    async fn predict(&self, words: &[String]) -> Result<Vec<String>>;

    /// Get predictor name for logging
    fn name(&self) -> &str;
}

/// Trait for the store that holds ingredient records
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch a random batch of records that have not been labeled
    async fn fetch_unlabeled(&self, limit: usize) -> Result<Vec<Record>>;

    /// Persist human labels for a record and mark it done
    async fn persist_labels(&self, record_id: &str, labels: &[String]) -> Result<()>;

    /// Get a record by ID
    async fn get_record(&self, record_id: &str) -> Result<Option<Record>>;

    /// Count labeled and pending records
    async fn stats(&self) -> Result<LabelingStats>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sorts_tokens_by_index() {
        let record = Record::new(
            "r1",
            "2 cups flour",
            vec![Token::new(2, "flour"), Token::new(0, "2"), Token::new(1, "cups")],
        );

        assert_eq!(record.words(), vec!["2", "cups", "flour"]);
        assert!(!record.labelling_done);
    }

    #[test]
    fn test_record_from_text() {
        let record = Record::from_text("r1", "1  large   egg");
        assert_eq!(record.tokens.len(), 3);
        assert_eq!(record.tokens[2], Token::new(2, "egg"));
    }

    #[test]
    fn test_apply_labels_by_index() {
        let mut record = Record::from_text("r1", "2 cups flour");
        let labels = vec!["B-QTY".to_string(), "B-UNIT".to_string()];

        record.apply_labels(&labels).unwrap();

        assert!(record.labelling_done);
        assert!(record.labelled_at.is_some());
        assert_eq!(record.tokens[0].label.as_deref(), Some("B-QTY"));
        assert_eq!(record.tokens[1].label.as_deref(), Some("B-UNIT"));
        assert_eq!(record.tokens[2].label, None);
    }

    #[test]
    fn test_apply_labels_only_once() {
        let mut record = Record::from_text("r1", "salt");
        record.apply_labels(&["B-NAME".to_string()]).unwrap();

        let err = record.apply_labels(&["OTHER".to_string()]).unwrap_err();
        assert!(matches!(err, SousError::Conflict(id) if id == "r1"));
        assert_eq!(record.tokens[0].label.as_deref(), Some("B-NAME"));
    }

    #[test]
    fn test_stats_completion_rate() {
        let stats = LabelingStats {
            total: 4,
            labeled: 1,
            pending: 3,
        };
        assert!((stats.completion_rate() - 25.0).abs() < f32::EPSILON);
        assert_eq!(LabelingStats::default().completion_rate(), 0.0);
    }

    struct ConstantPredictor;

    #[async_trait::async_trait]
    impl Predictor for ConstantPredictor {
        async fn predict(&self, words: &[String]) -> Result<Vec<String>> {
            Ok(vec!["OTHER".to_string(); words.len()])
        }

        fn name(&self) -> &str {
            "constant"
        }
    }

    #[test]
    fn test_predictor_trait_object() {
        let predictor: Box<dyn Predictor> = Box::new(ConstantPredictor);
        let record = Record::from_text("r1", "2 cups flour");

        let labels = tokio_test::block_on(predictor.predict(&record.words())).unwrap();
        assert_eq!(labels.len(), record.tokens.len());
        assert_eq!(predictor.name(), "constant");
    }

    #[test]
    fn test_record_deserialize_defaults() {
        let record: Record = serde_json::from_str(
            r#"{"id":"r9","value":"pinch salt","tokens":[{"index":0,"value":"pinch"}]}"#,
        )
        .unwrap();

        assert!(!record.labelling_done);
        assert_eq!(record.tokens[0].label, None);
    }
}
