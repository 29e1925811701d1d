//! Shared test utilities: in-process fakes for the external APIs

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use receipt_bot::api::{self, ApiState};
use receipt_bot::line::signature::{SIGNATURE_HEADER, sign};
use receipt_bot::line::{Blob, Message};
use receipt_bot::prompts::TRANSLATE_PROMPT;
use receipt_bot::{
    BlobFetcher, Dispatcher, Error, GenerativeModel, ReceiptStore, ReplySender, ScanReceipt,
    UserReceipts,
};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tower::ServiceExt;

pub const CHANNEL_SECRET: &str = "test-channel-secret";
pub const WEBHOOK_PATH: &str = "/callback";

/// Reply sender that records every reply
#[derive(Default)]
pub struct RecordingReplies {
    sent: Mutex<Vec<(String, Vec<Message>)>>,
    fail: bool,
}

impl RecordingReplies {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub async fn sent(&self) -> Vec<(String, Vec<Message>)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl ReplySender for RecordingReplies {
    async fn reply(&self, reply_token: &str, messages: Vec<Message>) -> receipt_bot::Result<()> {
        if self.fail {
            return Err(Error::Messaging("reply rejected".to_string()));
        }
        self.sent
            .lock()
            .await
            .push((reply_token.to_string(), messages));
        Ok(())
    }
}

/// Blob fetcher returning fixed bytes, failing for listed message IDs
#[derive(Default)]
pub struct FakeBlobs {
    missing: Vec<String>,
}

impl FakeBlobs {
    pub fn missing(ids: &[&str]) -> Self {
        Self {
            missing: ids.iter().map(ToString::to_string).collect(),
        }
    }
}

#[async_trait]
impl BlobFetcher for FakeBlobs {
    async fn fetch(&self, message_id: &str) -> receipt_bot::Result<Blob> {
        if self.missing.iter().any(|id| id == message_id) {
            return Err(Error::Blob(format!("no content for {message_id}")));
        }
        Ok(Blob {
            bytes: format!("image-{message_id}").into_bytes(),
            content_type: Some("image/jpeg".to_string()),
        })
    }
}

/// Generative model with scripted answers
///
/// Text prompts pop queued answers; translation prompts echo their input
/// when no answer is queued. Image prompts return `vision`.
#[derive(Default)]
pub struct ScriptedModel {
    vision: Vec<String>,
    text: Mutex<VecDeque<Vec<String>>>,
    pub text_prompts: Mutex<Vec<(String, bool)>>,
    pub image_calls: Mutex<Vec<(Vec<u8>, String, String)>>,
    fail: bool,
}

impl ScriptedModel {
    /// Answers text prompts with the given fragment lists, in order
    pub fn answering(answers: Vec<Vec<&str>>) -> Self {
        Self {
            text: Mutex::new(
                answers
                    .into_iter()
                    .map(|a| a.into_iter().map(ToString::to_string).collect())
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Reads every image as `output`; translation passes it through
    pub fn reading(output: &str) -> Self {
        Self {
            vision: vec![output.to_string()],
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate_text(&self, prompt: &str, json_mode: bool) -> receipt_bot::Result<Vec<String>> {
        if self.fail {
            return Err(Error::Model("quota exceeded".to_string()));
        }
        self.text_prompts
            .lock()
            .await
            .push((prompt.to_string(), json_mode));

        if let Some(answer) = self.text.lock().await.pop_front() {
            return Ok(answer);
        }

        match prompt.strip_prefix(TRANSLATE_PROMPT) {
            Some(rest) => Ok(vec![
                rest.split_once("\n --- \n ")
                    .map_or(rest, |(_, input)| input)
                    .to_string(),
            ]),
            None => Ok(Vec::new()),
        }
    }

    async fn generate_from_image(
        &self,
        image: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> receipt_bot::Result<Vec<String>> {
        if self.fail {
            return Err(Error::Model("quota exceeded".to_string()));
        }
        self.image_calls
            .lock()
            .await
            .push((image.to_vec(), mime_type.to_string(), prompt.to_string()));
        Ok(self.vision.clone())
    }
}

/// In-memory append-only receipt store
#[derive(Default)]
pub struct MemoryStore {
    receipts: Mutex<HashMap<String, UserReceipts>>,
    next_key: Mutex<u64>,
    fail_reads: bool,
}

impl MemoryStore {
    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub async fn seed(&self, user_id: &str, key: &str, receipt: ScanReceipt) {
        self.receipts
            .lock()
            .await
            .entry(user_id.to_string())
            .or_default()
            .insert(key.to_string(), receipt);
    }

    pub async fn stored(&self, user_id: &str) -> Vec<ScanReceipt> {
        self.receipts
            .lock()
            .await
            .get(user_id)
            .map(|r| r.values().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn total(&self) -> usize {
        self.receipts.lock().await.values().map(|r| r.len()).sum()
    }
}

#[async_trait]
impl ReceiptStore for MemoryStore {
    async fn load(&self, user_id: &str) -> receipt_bot::Result<UserReceipts> {
        if self.fail_reads {
            return Err(Error::Store("permission denied".to_string()));
        }
        Ok(self
            .receipts
            .lock()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn push(&self, user_id: &str, receipt: &ScanReceipt) -> receipt_bot::Result<String> {
        let key = {
            let mut next = self.next_key.lock().await;
            *next += 1;
            let n = *next;
            format!("-key{n:04}")
        };
        self.seed(user_id, &key, receipt.clone()).await;
        Ok(key)
    }
}

/// Router plus handles on its fakes
pub struct TestApp {
    pub router: Router,
    pub replies: Arc<RecordingReplies>,
    pub model: Arc<ScriptedModel>,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new(model: ScriptedModel) -> Self {
        Self::with_fakes(model, RecordingReplies::default(), FakeBlobs::default(), MemoryStore::default())
    }

    /// Dispatcher asking the model for JSON output on translation
    pub fn with_json_mode(model: ScriptedModel) -> Self {
        Self::build(
            model,
            RecordingReplies::default(),
            FakeBlobs::default(),
            MemoryStore::default(),
            true,
        )
    }

    pub fn with_fakes(
        model: ScriptedModel,
        replies: RecordingReplies,
        blobs: FakeBlobs,
        store: MemoryStore,
    ) -> Self {
        Self::build(model, replies, blobs, store, false)
    }

    fn build(
        model: ScriptedModel,
        replies: RecordingReplies,
        blobs: FakeBlobs,
        store: MemoryStore,
        json_mode: bool,
    ) -> Self {
        let replies = Arc::new(replies);
        let model = Arc::new(model);
        let store = Arc::new(store);

        let dispatcher = Dispatcher::new(
            replies.clone(),
            Arc::new(blobs),
            model.clone(),
            store.clone(),
        )
        .json_mode(json_mode);
        let state = Arc::new(ApiState {
            channel_secret: SecretString::from(CHANNEL_SECRET),
            dispatcher,
        });

        Self {
            router: api::router(state, WEBHOOK_PATH),
            replies,
            model,
            store,
        }
    }

    /// Post a correctly signed webhook body
    pub async fn post_signed(&self, body: &str) -> StatusCode {
        let signature = sign(CHANNEL_SECRET, body.as_bytes());
        self.post(body, Some(&signature)).await
    }

    /// Post a webhook body with an arbitrary signature header
    pub async fn post(&self, body: &str, signature: Option<&str>) -> StatusCode {
        let mut request = Request::builder()
            .method("POST")
            .uri(WEBHOOK_PATH)
            .header("content-type", "application/json");
        if let Some(signature) = signature {
            request = request.header(SIGNATURE_HEADER, signature);
        }

        let response = self
            .router
            .clone()
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        response.status()
    }
}

/// Webhook body wrapping events
pub fn webhook_body(events: Vec<Value>) -> String {
    json!({"destination": "Ubot", "events": events}).to_string()
}

pub fn text_event(reply_token: &str, user_id: &str, text: &str) -> Value {
    json!({
        "type": "message",
        "mode": "active",
        "timestamp": 1_700_000_000_000_i64,
        "replyToken": reply_token,
        "source": {"type": "user", "userId": user_id},
        "message": {"id": "1", "type": "text", "text": text}
    })
}

pub fn image_event(reply_token: &str, user_id: &str, message_id: &str) -> Value {
    json!({
        "type": "message",
        "mode": "active",
        "timestamp": 1_700_000_000_000_i64,
        "replyToken": reply_token,
        "source": {"type": "user", "userId": user_id},
        "message": {"id": message_id, "type": "image", "contentProvider": {"type": "line"}}
    })
}

/// Receipt JSON wrapped in a code fence, the way the model tends to answer
pub fn fenced_receipt(item_price: i64) -> String {
    format!(
        "```json\n{}\n```",
        serde_json::to_string_pretty(&json!({
            "Receipt": {
                "ReceiptID": "202403011230",
                "PurchaseStore": "GS25",
                "PurchaseDate": "2024-03-01 12:30",
                "PurchaseAddress": "Seoul",
                "TotalAmount": item_price
            },
            "Items": [{
                "ItemID": "2024030112301",
                "ReceiptID": "202403011230",
                "ItemName": "우유(牛奶)",
                "ItemPrice": item_price
            }]
        }))
        .unwrap()
    )
}

/// All text values of a message (text body or Flex text components)
pub fn message_texts(message: &Message) -> Vec<String> {
    fn walk(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::Object(map) => {
                if map.get("type").and_then(Value::as_str) == Some("text") {
                    if let Some(text) = map.get("text").and_then(Value::as_str) {
                        out.push(text.to_string());
                    }
                }
                map.values().for_each(|v| walk(v, out));
            }
            Value::Array(items) => items.iter().for_each(|v| walk(v, out)),
            _ => {}
        }
    }

    let mut out = Vec::new();
    walk(&serde_json::to_value(message).unwrap(), &mut out);
    out
}
