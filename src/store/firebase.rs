//! Firebase Realtime Database receipt store
//!
//! Uses the REST API: `GET {db}/receipt/{user}.json` reads every receipt of a
//! user, `POST` to the same path appends one under a generated push ID.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::credentials::{ServiceAccount, TokenSource};
use super::{ReceiptStore, UserReceipts, user_path};
use crate::receipt::ScanReceipt;
use crate::{Error, Result};

/// Receipt store backed by Firebase Realtime Database
pub struct FirebaseStore {
    client: reqwest::Client,
    database_url: String,
    tokens: Option<TokenSource>,
}

/// Response to a push
#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

impl FirebaseStore {
    /// Create a store for a database
    ///
    /// Without credentials requests are unauthenticated, which only works
    /// against open rules or the local emulator.
    ///
    /// # Errors
    ///
    /// Returns error if the credentials can't be loaded
    pub fn new(database_url: &str, credentials: Option<&SecretString>) -> Result<Self> {
        if database_url.trim().is_empty() {
            return Err(Error::Config("Firebase database URL is empty".to_string()));
        }

        let client = reqwest::Client::new();
        let tokens = match credentials {
            Some(raw) => {
                let account = ServiceAccount::from_inline_or_path(raw.expose_secret())?;
                tracing::info!(client_email = %account.client_email, "using service account");
                Some(TokenSource::new(account, client.clone()))
            }
            None => {
                tracing::warn!("no service account configured, database requests are unauthenticated");
                None
            }
        };

        Ok(Self {
            client,
            database_url: database_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    fn user_url(&self, user_id: &str) -> Result<String> {
        if user_id.is_empty() {
            return Err(Error::Store("missing user id".to_string()));
        }
        let encoded = urlencoding::encode(user_id);
        Ok(format!("{}/{}.json", self.database_url, user_path(&encoded)))
    }

    async fn authorize(&self, request: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        Ok(match &self.tokens {
            Some(tokens) => {
                let token = tokens.access_token().await?;
                request.query(&[("access_token", token)])
            }
            None => request,
        })
    }
}

#[async_trait]
impl ReceiptStore for FirebaseStore {
    async fn load(&self, user_id: &str) -> Result<UserReceipts> {
        let url = self.user_url(user_id)?;
        let response = self
            .authorize(self.client.get(&url))
            .await?
            .send()
            .await
            .map_err(|e| Error::Store(format!("read failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Store(format!("read error {status}: {body}")));
        }

        // An empty location reads as JSON null
        let receipts: Option<UserReceipts> = response
            .json()
            .await
            .map_err(|e| Error::Store(format!("failed to decode receipts: {e}")))?;

        let receipts = receipts.unwrap_or_default();
        tracing::debug!(user_id, count = receipts.len(), "loaded receipts");
        Ok(receipts)
    }

    async fn push(&self, user_id: &str, receipt: &ScanReceipt) -> Result<String> {
        let url = self.user_url(user_id)?;
        let response = self
            .authorize(self.client.post(&url).json(receipt))
            .await?
            .send()
            .await
            .map_err(|e| Error::Store(format!("push failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Store(format!("push error {status}: {body}")));
        }

        let pushed: PushResponse = response
            .json()
            .await
            .map_err(|e| Error::Store(format!("failed to decode push response: {e}")))?;

        tracing::info!(user_id, key = %pushed.name, "receipt stored");
        Ok(pushed.name)
    }
}
