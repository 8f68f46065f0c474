//! API route definitions
//!
//! Author: sous maintainers

use crate::handlers::records;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Create API v1 routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/records/pending", get(records::list_pending))
        .route("/records/:id", get(records::get_record))
        .route("/records/:id/labels", post(records::submit_labels))
        .route("/stats", get(records::get_stats))
}
