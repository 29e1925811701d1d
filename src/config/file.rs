//! TOML configuration file loading
//!
//! Supports `~/.config/receipt-bot/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// LINE channel configuration
    #[serde(default)]
    pub line: LineFileConfig,

    /// Gemini configuration
    #[serde(default)]
    pub gemini: GeminiFileConfig,

    /// Firebase configuration
    #[serde(default)]
    pub firebase: FirebaseFileConfig,

    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,
}

/// LINE Messaging API configuration
#[derive(Debug, Default, Deserialize)]
pub struct LineFileConfig {
    pub channel_secret: Option<String>,
    pub channel_access_token: Option<String>,
}

/// Gemini model configuration
#[derive(Debug, Default, Deserialize)]
pub struct GeminiFileConfig {
    pub api_key: Option<String>,

    /// Model used for chat and translation (e.g. "gemini-pro")
    pub text_model: Option<String>,

    /// Model used for receipt images (e.g. "gemini-pro-vision")
    pub vision_model: Option<String>,

    /// Ask for `application/json` output on the translation call; needs a
    /// model that supports it, such as "gemini-1.5-flash"
    pub json_mode: Option<bool>,
}

/// Firebase Realtime Database configuration
#[derive(Debug, Default, Deserialize)]
pub struct FirebaseFileConfig {
    pub database_url: Option<String>,

    /// Service account JSON, inline or as a file path
    pub credentials: Option<String>,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    pub port: Option<u16>,
    pub webhook_path: Option<String>,

    /// Text that triggers the sample receipt card
    pub trigger_keyword: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `ConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> ConfigFile {
    config_file_path().map_or_else(ConfigFile::default, |path| load_from(&path))
}

/// Load a TOML config file from an explicit path
///
/// Missing or invalid files fall back to defaults.
pub fn load_from(path: &Path) -> ConfigFile {
    if !path.exists() {
        return ConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/receipt-bot/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("receipt-bot").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[gemini]
text_model = "gemini-1.5-flash"

[server]
port = 9000
"#,
        )
        .unwrap();

        let fc = load_from(&path);
        assert_eq!(fc.gemini.text_model.as_deref(), Some("gemini-1.5-flash"));
        assert_eq!(fc.server.port, Some(9000));
        assert!(fc.line.channel_secret.is_none());
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "server = [[[").unwrap();

        let fc = load_from(&path);
        assert!(fc.server.port.is_none());
    }

    #[test]
    fn missing_file_is_default() {
        let fc = load_from(Path::new("/nonexistent/receipt-bot/config.toml"));
        assert!(fc.firebase.database_url.is_none());
    }
}
