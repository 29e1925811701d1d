//! Error types for the receipt bot

use thiserror::Error;

/// Result type alias for receipt bot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the receipt bot
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Service account credentials could not be loaded or used
    #[error("credentials error: {0}")]
    Credentials(String),

    /// Webhook signature missing or mismatched
    #[error("invalid webhook signature")]
    InvalidSignature,

    /// Webhook body could not be parsed
    #[error("invalid webhook payload: {0}")]
    Payload(String),

    /// LINE messaging API error
    #[error("messaging error: {0}")]
    Messaging(String),

    /// LINE content blob error
    #[error("blob error: {0}")]
    Blob(String),

    /// Generative model error
    #[error("model error: {0}")]
    Model(String),

    /// Receipt store error
    #[error("store error: {0}")]
    Store(String),

    /// Receipt could not be extracted from model output
    #[error("receipt parse error: {0}")]
    Receipt(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
