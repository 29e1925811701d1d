//! Webhook endpoints for channel integrations

use std::sync::Arc;

use axum::{Router, routing::post};

use super::ApiState;

pub mod line;

/// Build webhooks router with the LINE callback at `path`
pub fn router(state: Arc<ApiState>, path: &str) -> Router {
    Router::new()
        .route(path, post(line::handle_callback))
        .with_state(state)
}
