//! Receipt Bot - LINE webhook bot for scanning and querying receipts
//!
//! Receives LINE Messaging API webhooks, reads receipt photos with Gemini,
//! stores the parsed receipts in Firebase Realtime Database and answers
//! questions about them.
//!
//! # Flow
//!
//! ```text
//! POST /callback ──► signature check ──► events
//!                                          │
//!            ┌───────────────┬─────────────┴───────┬──────────────┐
//!            ▼               ▼                     ▼              ▼
//!      text: keyword   text: question        image: receipt   other: log
//!       sample card   receipts + Gemini   Gemini ×2 + store
//!            └───────────────┴─────────────┬───────┘
//!                                          ▼
//!                                   LINE reply API
//! ```

pub mod api;
pub mod card;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gemini;
pub mod line;
pub mod prompts;
pub mod receipt;
pub mod store;

pub use config::Config;
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use gemini::{GeminiClient, GenerativeModel};
pub use line::{BlobFetcher, LineClient, ReplySender};
pub use receipt::{Item, Receipt, ScanReceipt};
pub use store::{FirebaseStore, ReceiptStore, UserReceipts};
