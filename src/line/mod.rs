//! LINE Messaging API integration
//!
//! Inbound webhook parsing and signature checks, outbound replies and
//! message content downloads.

mod client;
pub mod message;
pub mod signature;
pub mod webhook;

use async_trait::async_trait;

pub use client::LineClient;
pub use message::Message;
pub use webhook::{CallbackRequest, Event, MessageContent, MessageEvent, Source, parse_request};

use crate::Result;

/// Downloaded message content
#[derive(Debug, Clone)]
pub struct Blob {
    pub bytes: Vec<u8>,

    /// MIME type reported by the content endpoint, if any
    pub content_type: Option<String>,
}

/// Sends replies to webhook events
#[async_trait]
pub trait ReplySender: Send + Sync {
    /// Reply to one event. A reply token can be used once.
    async fn reply(&self, reply_token: &str, messages: Vec<Message>) -> Result<()>;
}

/// Fetches binary content attached to a message
#[async_trait]
pub trait BlobFetcher: Send + Sync {
    async fn fetch(&self, message_id: &str) -> Result<Blob>;
}
