//! Google service account authentication
//!
//! Exchanges a signed JWT for an OAuth access token and caches it until
//! shortly before expiry.

use std::path::Path;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{Error, Result};

const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const TOKEN_SCOPE: &str =
    "https://www.googleapis.com/auth/firebase.database https://www.googleapis.com/auth/userinfo.email";

/// Refresh tokens this many seconds before they expire
const EXPIRY_MARGIN_SECS: i64 = 300;

/// Service account key file contents
#[derive(Deserialize)]
pub struct ServiceAccount {
    pub client_email: String,
    private_key: SecretString,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
}

impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

/// JWT claims for Google OAuth
#[derive(Debug, Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

/// Token response from Google
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Cached token info
struct TokenInfo {
    access_token: String,
    expires_at: i64,
}

impl ServiceAccount {
    /// Parse service account JSON given inline or as a path to a key file
    ///
    /// # Errors
    ///
    /// Returns error if the file can't be read or the JSON is not a service account
    pub fn from_inline_or_path(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.starts_with('{') {
            return Self::from_json(trimmed);
        }

        let content = std::fs::read_to_string(Path::new(trimmed)).map_err(|e| {
            Error::Credentials(format!("failed to read service account {trimmed}: {e}"))
        })?;
        Self::from_json(&content)
    }

    fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Credentials(format!("failed to parse service account: {e}")))
    }

    fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(GOOGLE_TOKEN_URL)
    }

    /// Create JWT for token request
    fn create_jwt(&self, now: i64) -> Result<String> {
        use jsonwebtoken::{Algorithm, EncodingKey, Header};

        let header = Header::new(Algorithm::RS256);
        let claims = JwtClaims {
            iss: &self.client_email,
            scope: TOKEN_SCOPE,
            aud: self.token_uri(),
            exp: now + 3600,
            iat: now,
        };

        let key = EncodingKey::from_rsa_pem(self.private_key.expose_secret().as_bytes())
            .map_err(|e| Error::Credentials(format!("invalid private key: {e}")))?;

        jsonwebtoken::encode(&header, &claims, &key)
            .map_err(|e| Error::Credentials(format!("JWT encoding failed: {e}")))
    }
}

/// Service account plus its cached access token
pub(super) struct TokenSource {
    account: ServiceAccount,
    client: reqwest::Client,
    token: Mutex<Option<TokenInfo>>,
}

impl TokenSource {
    pub(super) fn new(account: ServiceAccount, client: reqwest::Client) -> Self {
        Self {
            account,
            client,
            token: Mutex::new(None),
        }
    }

    /// Get or refresh access token
    pub(super) async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        let now = Utc::now().timestamp();

        if let Some(token) = guard.as_ref() {
            if token.expires_at > now + EXPIRY_MARGIN_SECS {
                return Ok(token.access_token.clone());
            }
        }

        let jwt = self.account.create_jwt(now)?;

        let response = self
            .client
            .post(self.account.token_uri())
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", &jwt),
            ])
            .send()
            .await
            .map_err(|e| Error::Credentials(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Credentials(format!(
                "token request failed: {status} - {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Credentials(format!("token parse error: {e}")))?;

        tracing::debug!(
            client_email = %self.account.client_email,
            expires_in = token.expires_in,
            "refreshed access token"
        );

        *guard = Some(TokenInfo {
            access_token: token.access_token.clone(),
            expires_at: now + token.expires_in,
        });

        Ok(token.access_token)
    }
}
