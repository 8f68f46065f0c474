//! Labeling page handlers
//!
//! `GET /` shows a batch of unlabeled ingredients with model suggestions;
//! `POST /ingredient/:id` stores the reviewed labels and returns to the page.

use crate::error::AppError;
use crate::models::{IngredientView, StatsResponse};
use crate::render::IndexPage;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};
use sous_tagger::{log_aligned, IngredientTag};
use std::collections::HashMap;
use std::sync::Arc;

/// Fetch unlabeled records and attach model predictions
pub(crate) async fn review_batch(
    state: &AppState,
    limit: usize,
) -> Result<Vec<IngredientView>, AppError> {
    let records = state.store.fetch_unlabeled(limit).await?;
    let mut ingredients = Vec::with_capacity(records.len());

    for record in &records {
        let words = record.words();
        let preds = state.predictor.predict(&words).await?;
        log_aligned(&words, &preds);
        ingredients.push(IngredientView::new(record, preds));
    }

    Ok(ingredients)
}

/// Render the labeling page
pub async fn home(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    state.increment_requests();

    let ingredients = review_batch(&state, state.config.labeling.batch_size).await?;
    let stats = match state.store.stats().await {
        Ok(stats) => Some(StatsResponse::from(stats)),
        Err(e) => {
            tracing::warn!("Could not load labeling stats: {}", e);
            None
        }
    };
    let labels = IngredientTag::label_set();

    let html = state.renderer.render_index(&IndexPage {
        ingredients: &ingredients,
        labels: &labels,
        stats,
    })?;

    Ok(Html(html))
}

/// Store labels submitted from the labeling form
pub async fn submit_ingredient(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Redirect, AppError> {
    state.increment_requests();

    let labels = state.extractor.labels(&form)?;
    tracing::info!("Labels for ingredient {}: {:?}", id, labels);

    state.store.persist_labels(&id, &labels).await?;
    state.increment_submissions();

    Ok(Redirect::to("/"))
}
