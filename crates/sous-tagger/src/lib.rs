//! SOUS Tagger - Token labeling logic
//!
//! - `form`: recovers ordered labels from a submitted labeling form
//! - `align`: column-aligned rendering of tokens and predictions for logs
//! - `ner`: rule-based ingredient tagger
//! - `http`: client for a remote NER model server
//!
//! Author: sous maintainers

pub mod align;
pub mod form;
pub mod http;
pub mod ner;

use std::sync::Arc;

pub use align::{align_columns, log_aligned, AlignError};
pub use form::{extract_label_keys, extract_labels, ExtractError, LabelExtractor};
pub use http::HttpPredictor;
pub use ner::{IngredientTag, RuleBasedPredictor};

use sous_core::{ModelBackend, ModelConfig, Predictor, Result};

/// Build the predictor selected in the model configuration
pub fn build_predictor(config: &ModelConfig) -> Result<Arc<dyn Predictor>> {
    let predictor: Arc<dyn Predictor> = match config.backend {
        ModelBackend::Http => Arc::new(HttpPredictor::from_config(config)?),
        ModelBackend::Rules => Arc::new(RuleBasedPredictor::new()),
    };
    tracing::info!("Using {} predictor", predictor.name());
    Ok(predictor)
}
