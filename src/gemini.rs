//! Gemini generative model client
//!
//! Uses the `generateContent` REST endpoint for both text prompts and
//! image-plus-text prompts.

use async_trait::async_trait;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Text and vision generation
///
/// Both calls return the text fragments of every candidate, in order.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Generate text from a text prompt
    ///
    /// With `json_mode` the model is asked for `application/json` output.
    async fn generate_text(&self, prompt: &str, json_mode: bool) -> Result<Vec<String>>;

    /// Generate text from an image and a text prompt
    async fn generate_from_image(
        &self,
        image: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<Vec<String>>;
}

/// Gemini REST client
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    text_model: String,
    vision_model: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    Text(&'a str),
    InlineData(InlineData<'a>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_fragments(self) -> Vec<String> {
        self.candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect()
    }
}

impl GeminiClient {
    /// Create a client for the given models
    #[must_use]
    pub fn new(api_key: SecretString, text_model: String, vision_model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: GEMINI_API_URL.to_string(),
            text_model,
            vision_model,
        }
    }

    /// Use a different API base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }

    async fn generate(&self, model: &str, request: &GenerateRequest<'_>) -> Result<Vec<String>> {
        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Model(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Model(format!("Gemini API error {status}: {body}")));
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Model(format!("parse error: {e}")))?;

        let fragments = result.into_fragments();
        for fragment in &fragments {
            tracing::debug!(model, fragment = %fragment, "model output");
        }
        Ok(fragments)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_text(&self, prompt: &str, json_mode: bool) -> Result<Vec<String>> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part::Text(prompt)],
            }],
            generation_config: json_mode.then_some(GenerationConfig {
                response_mime_type: "application/json",
            }),
        };
        self.generate(&self.text_model, &request).await
    }

    async fn generate_from_image(
        &self,
        image: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<Vec<String>> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::InlineData(InlineData {
                        mime_type: normalize_mime_type(mime_type),
                        data: base64::engine::general_purpose::STANDARD.encode(image),
                    }),
                    Part::Text(prompt),
                ],
            }],
            generation_config: None,
        };
        self.generate(&self.vision_model, &request).await
    }
}

/// Normalize an image MIME type to one Gemini accepts
fn normalize_mime_type(mime_type: &str) -> &'static str {
    let essence = mime_type.split(';').next().unwrap_or_default().trim();
    match essence.to_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => "image/jpeg",
        "image/webp" => "image/webp",
        "image/heic" => "image/heic",
        "image/heif" => "image/heif",
        // png and anything unknown
        _ => "image/png",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn text_request_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part::Text("hello")],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
            }),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}],
                "generationConfig": {"responseMimeType": "application/json"}
            })
        );
    }

    #[test]
    fn image_part_shape() {
        let part = Part::InlineData(InlineData {
            mime_type: "image/png",
            data: base64::engine::general_purpose::STANDARD.encode(b"png"),
        });
        assert_eq!(
            serde_json::to_value(&part).unwrap(),
            json!({"inlineData": {"mimeType": "image/png", "data": "cG5n"}})
        );
    }

    #[test]
    fn fragments_keep_candidate_and_part_order() {
        let raw = json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "a"}, {"text": "b"}]}, "finishReason": "STOP"},
                {"finishReason": "SAFETY"},
                {"content": {"role": "model", "parts": [{"inlineData": {}}, {"text": "c"}]}}
            ],
            "usageMetadata": {"totalTokenCount": 3}
        });
        let response: GenerateResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(response.into_fragments(), ["a", "b", "c"]);
    }

    #[test]
    fn empty_response_has_no_fragments() {
        let response: GenerateResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.into_fragments().is_empty());
    }

    #[test]
    fn endpoint_uses_model() {
        let client = GeminiClient::new(
            SecretString::from("key"),
            "gemini-pro".to_string(),
            "gemini-pro-vision".to_string(),
        );
        assert_eq!(
            client.endpoint("gemini-pro"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn mime_types() {
        assert_eq!(normalize_mime_type("image/jpeg"), "image/jpeg");
        assert_eq!(normalize_mime_type("IMAGE/JPG"), "image/jpeg");
        assert_eq!(normalize_mime_type("image/png; charset=binary"), "image/png");
        assert_eq!(normalize_mime_type("application/octet-stream"), "image/png");
    }
}
