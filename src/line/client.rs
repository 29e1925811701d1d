//! HTTP client for the LINE messaging and content APIs

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::message::MAX_REPLY_MESSAGES;
use super::{Blob, BlobFetcher, Message, ReplySender};
use crate::{Error, Result};

const LINE_API_URL: &str = "https://api.line.me";
const LINE_DATA_API_URL: &str = "https://api-data.line.me";

/// Client for replying to events and downloading message content
pub struct LineClient {
    client: Client,
    access_token: SecretString,
    api_url: String,
    data_api_url: String,
}

/// Reply request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: &'a [Message],
}

impl LineClient {
    /// Create a client using the channel access token
    #[must_use]
    pub fn new(access_token: SecretString) -> Self {
        Self {
            client: Client::new(),
            access_token,
            api_url: LINE_API_URL.to_string(),
            data_api_url: LINE_DATA_API_URL.to_string(),
        }
    }

    /// Point both APIs at another base URL (local fakes, proxies)
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        self.api_url.clone_from(&base);
        self.data_api_url = base;
        self
    }

    fn reply_url(&self) -> String {
        format!("{}/v2/bot/message/reply", self.api_url)
    }

    fn content_url(&self, message_id: &str) -> String {
        format!(
            "{}/v2/bot/message/{}/content",
            self.data_api_url,
            urlencoding::encode(message_id)
        )
    }
}

#[async_trait]
impl ReplySender for LineClient {
    async fn reply(&self, reply_token: &str, messages: Vec<Message>) -> Result<()> {
        if messages.len() > MAX_REPLY_MESSAGES {
            return Err(Error::Messaging(format!(
                "{} messages exceed the reply limit of {MAX_REPLY_MESSAGES}",
                messages.len()
            )));
        }

        let body = ReplyRequest {
            reply_token,
            messages: &messages,
        };

        let response = self
            .client
            .post(self.reply_url())
            .bearer_auth(self.access_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Messaging(format!("reply request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Messaging(format!("LINE API error {status}: {body}")));
        }

        tracing::debug!(count = messages.len(), "reply sent");
        Ok(())
    }
}

#[async_trait]
impl BlobFetcher for LineClient {
    async fn fetch(&self, message_id: &str) -> Result<Blob> {
        let response = self
            .client
            .get(self.content_url(message_id))
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| Error::Blob(format!("content request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Blob(format!("LINE content error {status}: {body}")));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Blob(format!("failed to read content: {e}")))?
            .to_vec();

        tracing::debug!(message_id, size = bytes.len(), ?content_type, "downloaded content");
        Ok(Blob {
            bytes,
            content_type,
        })
    }
}
