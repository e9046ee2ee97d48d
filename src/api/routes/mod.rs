//! API routes module

pub mod gmail;

use std::sync::Arc;

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<AppState>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Gmail routes
        .nest("/gmail", gmail::router())
}
