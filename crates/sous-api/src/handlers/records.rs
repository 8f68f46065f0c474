//! JSON API for ingredient records

use crate::error::AppError;
use crate::handlers::labeling::review_batch;
use crate::models::{IngredientView, StatsResponse};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use sous_core::Record;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

/// Upper bound on records returned per request
const MAX_PENDING_LIMIT: usize = 100;

/// Pending ingredients list response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PendingListResponse {
    pub ingredients: Vec<IngredientView>,
    pub total: usize,
}

/// Query parameters for pending list
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListPendingQuery {
    /// Maximum number of ingredients
    #[param(default = 10)]
    pub limit: Option<usize>,
}

/// List unlabeled ingredients with model predictions
#[utoipa::path(
    get,
    path = "/api/v1/records/pending",
    tag = "labeling",
    params(ListPendingQuery),
    responses(
        (status = 200, description = "Unlabeled ingredients", body = PendingListResponse),
        (status = 502, description = "Model prediction failed", body = crate::error::ApiError)
    )
)]
pub async fn list_pending(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListPendingQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let limit = params
        .limit
        .unwrap_or(state.config.labeling.batch_size)
        .min(MAX_PENDING_LIMIT);
    let ingredients = review_batch(&state, limit).await?;

    let response = PendingListResponse {
        total: ingredients.len(),
        ingredients,
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Labels for every token of an ingredient, in index order
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitLabelsRequest {
    #[schema(example = json!(["B-QTY", "B-UNIT", "B-NAME"]))]
    pub labels: Vec<String>,
}

/// Label submission response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitLabelsResponse {
    pub ingredient_id: String,
    pub status: String,
    pub labels: usize,
}

/// Store reviewed labels for an ingredient
#[utoipa::path(
    post,
    path = "/api/v1/records/{id}/labels",
    tag = "labeling",
    params(
        ("id" = String, Path, description = "Ingredient ID")
    ),
    request_body = SubmitLabelsRequest,
    responses(
        (status = 200, description = "Labels stored", body = SubmitLabelsResponse),
        (status = 400, description = "Empty label list", body = crate::error::ApiError),
        (status = 404, description = "Ingredient not found", body = crate::error::ApiError),
        (status = 409, description = "Ingredient already labeled", body = crate::error::ApiError)
    )
)]
pub async fn submit_labels(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<SubmitLabelsRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    if request.labels.is_empty() {
        return Err(AppError::BadRequest("labels must not be empty".to_string()));
    }

    state.store.persist_labels(&id, &request.labels).await?;
    state.increment_submissions();
    tracing::info!("Labels for ingredient {}: {:?}", id, request.labels);

    let response = SubmitLabelsResponse {
        ingredient_id: id,
        status: "labeled".to_string(),
        labels: request.labels.len(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Token with its stored label
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenLabelView {
    pub index: u32,
    pub value: String,
    pub label: Option<String>,
}

/// Stored ingredient record
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordResponse {
    pub id: String,
    pub value: String,
    pub labelling_done: bool,
    /// RFC 3339 timestamp of the label submission
    pub labelled_at: Option<String>,
    pub tokens: Vec<TokenLabelView>,
}

impl From<Record> for RecordResponse {
    fn from(record: Record) -> Self {
        Self {
            id: record.id,
            value: record.value,
            labelling_done: record.labelling_done,
            labelled_at: record.labelled_at.map(|t| t.to_rfc3339()),
            tokens: record
                .tokens
                .into_iter()
                .map(|t| TokenLabelView {
                    index: t.index,
                    value: t.value,
                    label: t.label,
                })
                .collect(),
        }
    }
}

/// Get a stored ingredient record
#[utoipa::path(
    get,
    path = "/api/v1/records/{id}",
    tag = "labeling",
    params(
        ("id" = String, Path, description = "Ingredient ID")
    ),
    responses(
        (status = 200, description = "Ingredient record", body = RecordResponse),
        (status = 404, description = "Ingredient not found", body = crate::error::ApiError)
    )
)]
pub async fn get_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let record = state
        .store
        .get_record(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ingredient {id}")))?;

    Ok((StatusCode::OK, Json(RecordResponse::from(record))))
}

/// Get labeling progress
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    tag = "labeling",
    responses(
        (status = 200, description = "Labeling progress", body = StatsResponse)
    )
)]
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let stats = state.store.stats().await?;
    Ok((StatusCode::OK, Json(StatsResponse::from(stats))))
}
