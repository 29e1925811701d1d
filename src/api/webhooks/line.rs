//! LINE webhook handler

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use secrecy::ExposeSecret;

use crate::Error;
use crate::api::ApiState;
use crate::line::signature::SIGNATURE_HEADER;
use crate::line::parse_request;

/// Handle an incoming LINE webhook
///
/// 400 on a missing or bad signature, 500 on an unparsable body, otherwise
/// 200 once every event in the batch has been handled.
pub async fn handle_callback(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let request = match parse_request(state.channel_secret.expose_secret(), &body, signature) {
        Ok(request) => request,
        Err(Error::InvalidSignature) => {
            tracing::warn!("rejected webhook with invalid signature");
            return StatusCode::BAD_REQUEST;
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to parse webhook");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    tracing::debug!(events = request.events.len(), "received LINE webhook");
    state.dispatcher.dispatch(&request).await;

    StatusCode::OK
}
