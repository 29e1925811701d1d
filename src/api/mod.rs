//! HTTP API server for the receipt bot

pub mod health;
pub mod webhooks;

use std::sync::Arc;

use axum::Router;
use secrecy::SecretString;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::gemini::GeminiClient;
use crate::line::LineClient;
use crate::store::FirebaseStore;
use crate::{Error, Result};

/// Shared state for API handlers
///
/// Built once at startup and read-only afterwards.
pub struct ApiState {
    /// LINE channel secret for webhook signatures
    pub channel_secret: SecretString,
    pub dispatcher: Dispatcher,
}

impl ApiState {
    /// Build the external clients from configuration
    ///
    /// # Errors
    ///
    /// Returns error if a client can't be initialized
    pub fn from_config(config: Config) -> Result<Self> {
        let line = Arc::new(LineClient::new(config.line.channel_access_token));
        let model = Arc::new(GeminiClient::new(
            config.gemini.api_key,
            config.gemini.text_model,
            config.gemini.vision_model,
        ));
        let store = Arc::new(FirebaseStore::new(
            &config.firebase.database_url,
            config.firebase.credentials.as_ref(),
        )?);

        let dispatcher = Dispatcher::new(line.clone(), line, model, store)
            .with_server_config(&config.server)
            .json_mode(config.gemini.json_mode);

        Ok(Self {
            channel_secret: config.line.channel_secret,
            dispatcher,
        })
    }
}

/// HTTP server exposing the webhook and health endpoints
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
    webhook_path: String,
}

impl ApiServer {
    /// Create a new API server
    #[must_use]
    pub fn new(state: ApiState, port: u16, webhook_path: impl Into<String>) -> Self {
        Self {
            state: Arc::new(state),
            port,
            webhook_path: webhook_path.into(),
        }
    }

    /// Build the router
    #[must_use]
    pub fn router(&self) -> Router {
        router(self.state.clone(), &self.webhook_path)
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, webhook_path = %self.webhook_path, "API server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}

/// Build the full application router
pub fn router(state: Arc<ApiState>, webhook_path: &str) -> Router {
    Router::new()
        .merge(webhooks::router(state, webhook_path))
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
}
