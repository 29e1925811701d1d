//! Webhook event dispatch
//!
//! Routes each event of a verified batch to its handler. Events are handled
//! one after another in arrival order; a failing event is logged and the
//! rest of the batch still runs.

use std::sync::Arc;

use crate::card::{self, CardData};
use crate::config::{DEFAULT_JSON_MODE, DEFAULT_TRIGGER_KEYWORD, ServerConfig};
use crate::gemini::GenerativeModel;
use crate::line::webhook::{BeaconEvent, PostbackEvent};
use crate::line::{BlobFetcher, CallbackRequest, Event, Message, MessageContent, MessageEvent, ReplySender};
use crate::store::{ReceiptStore, UserReceipts};
use crate::{Result, prompts, receipt};

/// MIME type assumed when the content endpoint doesn't report one
const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Routes webhook events to the model, the store and the reply API
pub struct Dispatcher {
    replies: Arc<dyn ReplySender>,
    blobs: Arc<dyn BlobFetcher>,
    model: Arc<dyn GenerativeModel>,
    store: Arc<dyn ReceiptStore>,
    trigger_keyword: String,
    json_mode: bool,
}

impl Dispatcher {
    /// Create a dispatcher over the external clients
    #[must_use]
    pub fn new(
        replies: Arc<dyn ReplySender>,
        blobs: Arc<dyn BlobFetcher>,
        model: Arc<dyn GenerativeModel>,
        store: Arc<dyn ReceiptStore>,
    ) -> Self {
        Self {
            replies,
            blobs,
            model,
            store,
            trigger_keyword: DEFAULT_TRIGGER_KEYWORD.to_string(),
            json_mode: DEFAULT_JSON_MODE,
        }
    }

    /// Set the text that triggers the sample card
    #[must_use]
    pub fn trigger_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.trigger_keyword = keyword.into();
        self
    }

    /// Ask the model for JSON output when translating receipts
    #[must_use]
    pub const fn json_mode(mut self, enabled: bool) -> Self {
        self.json_mode = enabled;
        self
    }

    /// Apply server settings
    #[must_use]
    pub fn with_server_config(self, server: &ServerConfig) -> Self {
        self.trigger_keyword(server.trigger_keyword.clone())
    }

    /// Handle every event of a batch in order
    pub async fn dispatch(&self, request: &CallbackRequest) {
        tracing::debug!(
            destination = %request.destination,
            events = request.events.len(),
            "dispatching webhook batch"
        );

        for event in &request.events {
            if let Err(e) = self.handle_event(event).await {
                tracing::error!(event = event.kind(), error = %e, "failed to handle event");
            }
        }
    }

    /// Handle a single event
    ///
    /// # Errors
    ///
    /// Returns error if a required external call fails; no reply is sent then
    pub async fn handle_event(&self, event: &Event) -> Result<()> {
        match event {
            Event::Message(message) => self.handle_message(message).await,
            Event::Follow(_) => {
                tracing::info!("got follow event");
                Ok(())
            }
            Event::Postback(PostbackEvent { postback, .. }) => {
                tracing::info!(data = %postback.data, "got postback");
                Ok(())
            }
            Event::Beacon(BeaconEvent { beacon, .. }) => {
                tracing::info!(hwid = %beacon.hwid, beacon_type = %beacon.beacon_type, "got beacon");
                Ok(())
            }
            Event::Other => {
                tracing::debug!("ignoring unsupported event");
                Ok(())
            }
        }
    }

    async fn handle_message(&self, event: &MessageEvent) -> Result<()> {
        tracing::info!(
            user_id = event.user_id(),
            received_at = ?event.received_at(),
            "got message event"
        );

        match &event.message {
            MessageContent::Text { text, .. } => {
                let Some(token) = event.reply_token.as_deref() else {
                    tracing::warn!("text message without reply token");
                    return Ok(());
                };
                self.handle_text(token, event.user_id(), text).await
            }
            MessageContent::Image { id } => {
                let Some(token) = event.reply_token.as_deref() else {
                    tracing::warn!(message_id = %id, "image message without reply token");
                    return Ok(());
                };
                self.handle_image(token, event.user_id(), id).await
            }
            MessageContent::Video { id } => {
                tracing::info!(message_id = %id, "got video message");
                Ok(())
            }
            MessageContent::Other => {
                tracing::info!("unknown message type");
                Ok(())
            }
        }
    }

    async fn handle_text(&self, reply_token: &str, user_id: &str, text: &str) -> Result<()> {
        if text == self.trigger_keyword {
            return self.reply(reply_token, vec![card::sample_card()]).await;
        }

        let receipts = match self.store.load(user_id).await {
            Ok(receipts) => receipts,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "failed to load receipts");
                UserReceipts::new()
            }
        };

        let receipts_json = serde_json::to_string(&receipts)?;
        let prompt = prompts::search_receipts_prompt(&receipts_json, text);
        let answer = self.model.generate_text(&prompt, false).await?.concat();

        self.reply(reply_token, vec![Message::text(answer)]).await
    }

    async fn handle_image(&self, reply_token: &str, user_id: &str, message_id: &str) -> Result<()> {
        tracing::info!(message_id, "got image message");

        let blob = self.blobs.fetch(message_id).await?;
        let mime_type = blob.content_type.as_deref().unwrap_or(DEFAULT_IMAGE_MIME);

        let scanned = self
            .model
            .generate_from_image(&blob.bytes, mime_type, prompts::RECEIPT_IMAGE_PROMPT)
            .await?
            .concat();

        let translated = self
            .model
            .generate_text(&prompts::translate_prompt(&scanned), self.json_mode)
            .await?
            .concat();

        let parsed = match receipt::parse_receipt(&translated) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(error = %e, "model output is not a receipt, not storing");
                None
            }
        };

        if let Some(parsed) = &parsed {
            if let Err(e) = self.store.push(user_id, parsed).await {
                tracing::warn!(user_id, error = %e, "failed to store receipt");
            }
        }

        let mut messages = vec![Message::text(scanned), Message::text(translated)];
        if let Some(parsed) = &parsed {
            messages.push(card::receipt_card(&CardData::from_receipt(parsed)));
        }

        self.reply(reply_token, messages).await
    }

    /// Send a reply, dropping empty text messages the reply API would reject
    async fn reply(&self, reply_token: &str, messages: Vec<Message>) -> Result<()> {
        let messages: Vec<Message> = messages
            .into_iter()
            .filter(|m| !matches!(m, Message::Text { text } if text.trim().is_empty()))
            .collect();

        if messages.is_empty() {
            tracing::warn!(reply_token, "model returned no text, not replying");
            return Ok(());
        }

        self.replies.reply(reply_token, messages).await
    }
}
