//! Sous API - ingredient labeling server
//!
//! Serves the labeling page, accepts reviewed labels and exposes the same
//! workflow as a JSON API.
//!
//! Author: sous maintainers

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod render;
pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use handlers::{health, labeling, records};
use state::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sous Ingredient Labeling API",
        description = "Human-in-the-loop review of ingredient NER labels"
    ),
    paths(
        health::health_check,
        health::readiness_check,
        records::list_pending,
        records::submit_labels,
        records::get_record,
        records::get_stats,
    ),
    components(schemas(
        error::ApiError,
        models::TokenView,
        models::IngredientView,
        models::StatsResponse,
        records::PendingListResponse,
        records::SubmitLabelsRequest,
        records::SubmitLabelsResponse,
        records::TokenLabelView,
        records::RecordResponse,
    )),
    tags(
        (name = "health", description = "Liveness and readiness probes"),
        (name = "labeling", description = "Ingredient label review")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let max_body_size = state.config.server.max_body_size;

    Router::new()
        .route("/", get(labeling::home))
        .route("/ingredient/:id", post(labeling::submit_ingredient))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api/v1", routes::api_routes())
        .layer(axum_middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum_middleware::from_fn(
            middleware::request_timing_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(max_body_size))
        .with_state(state)
}
