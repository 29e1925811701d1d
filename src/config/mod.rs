//! Configuration management for the receipt bot

pub mod file;

use secrecy::SecretString;

use crate::{Error, Result};
use file::ConfigFile;

/// Default model for chat and translation
pub const DEFAULT_TEXT_MODEL: &str = "gemini-pro";

/// Default model for receipt images
pub const DEFAULT_VISION_MODEL: &str = "gemini-pro-vision";

/// JSON output mode is off by default; `gemini-pro` rejects `responseMimeType`
pub const DEFAULT_JSON_MODE: bool = false;

/// Default text that triggers the sample receipt card
pub const DEFAULT_TRIGGER_KEYWORD: &str = "test";

/// Default webhook route
pub const DEFAULT_WEBHOOK_PATH: &str = "/callback";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Receipt bot configuration
#[derive(Debug)]
pub struct Config {
    /// LINE Messaging API channel
    pub line: LineConfig,

    /// Gemini API
    pub gemini: GeminiConfig,

    /// Firebase Realtime Database
    pub firebase: FirebaseConfig,

    /// HTTP server
    pub server: ServerConfig,
}

/// LINE channel credentials
#[derive(Debug)]
pub struct LineConfig {
    /// Channel secret used to verify webhook signatures
    pub channel_secret: SecretString,

    /// Long-lived channel access token for the messaging API
    pub channel_access_token: SecretString,
}

/// Gemini configuration
#[derive(Debug)]
pub struct GeminiConfig {
    pub api_key: SecretString,
    pub text_model: String,
    pub vision_model: String,

    /// Request `application/json` output when translating receipts
    pub json_mode: bool,
}

/// Firebase Realtime Database configuration
#[derive(Debug)]
pub struct FirebaseConfig {
    /// Database root, e.g. `https://my-project-default-rtdb.firebaseio.com`
    pub database_url: String,

    /// Service account JSON (inline) or path to it.
    /// Without credentials requests are sent unauthenticated.
    pub credentials: Option<SecretString>,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub webhook_path: String,
    pub trigger_keyword: String,
}

impl Config {
    /// Load configuration from the environment and the optional config file
    ///
    /// Priority: env > toml > default.
    ///
    /// # Errors
    ///
    /// Returns error if a required setting is missing
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Build configuration from a parsed config file and an env lookup
    ///
    /// # Errors
    ///
    /// Returns error if a required setting is missing or malformed
    pub fn from_sources<F>(fc: ConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let line = LineConfig {
            channel_secret: required(
                env("ChannelSecret").or(fc.line.channel_secret),
                "ChannelSecret",
            )?
            .into(),
            channel_access_token: required(
                env("ChannelAccessToken").or(fc.line.channel_access_token),
                "ChannelAccessToken",
            )?
            .into(),
        };

        let json_mode = match env("RECEIPT_BOT_JSON_MODE") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                Error::Config(format!("RECEIPT_BOT_JSON_MODE must be a boolean, got {raw:?}"))
            })?,
            None => fc.gemini.json_mode.unwrap_or(DEFAULT_JSON_MODE),
        };

        let gemini = GeminiConfig {
            api_key: required(
                env("GOOGLE_GEMINI_API_KEY").or(fc.gemini.api_key),
                "GOOGLE_GEMINI_API_KEY",
            )?
            .into(),
            text_model: env("RECEIPT_BOT_TEXT_MODEL")
                .or(fc.gemini.text_model)
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            vision_model: env("RECEIPT_BOT_VISION_MODEL")
                .or(fc.gemini.vision_model)
                .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
            json_mode,
        };

        let firebase = FirebaseConfig {
            database_url: required(
                env("FIREBASE_URL").or(fc.firebase.database_url),
                "FIREBASE_URL",
            )?
            .trim_end_matches('/')
            .to_string(),
            credentials: env("GOOGLE_APPLICATION_CREDENTIALS")
                .or(fc.firebase.credentials)
                .filter(|c| !c.trim().is_empty())
                .map(SecretString::from),
        };

        let port = match env("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("PORT must be a port number, got {raw:?}")))?,
            None => fc.server.port.unwrap_or(DEFAULT_PORT),
        };

        let mut webhook_path = env("RECEIPT_BOT_WEBHOOK_PATH")
            .or(fc.server.webhook_path)
            .unwrap_or_else(|| DEFAULT_WEBHOOK_PATH.to_string());
        if !webhook_path.starts_with('/') {
            webhook_path.insert(0, '/');
        }

        let server = ServerConfig {
            port,
            webhook_path,
            trigger_keyword: env("RECEIPT_BOT_TRIGGER")
                .or(fc.server.trigger_keyword)
                .unwrap_or_else(|| DEFAULT_TRIGGER_KEYWORD.to_string()),
        };

        Ok(Self {
            line,
            gemini,
            firebase,
            server,
        })
    }
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::Config(format!("{name} is not set")))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
