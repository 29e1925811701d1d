//! Receipt persistence
//!
//! Receipts are append-only per user: there is a full read and a push,
//! nothing else.

mod credentials;
mod firebase;

use std::collections::BTreeMap;

use async_trait::async_trait;

pub use credentials::ServiceAccount;
pub use firebase::FirebaseStore;

use crate::Result;
use crate::receipt::ScanReceipt;

/// Stored receipts keyed by the store-generated push ID
pub type UserReceipts = BTreeMap<String, ScanReceipt>;

/// Per-user receipt storage
#[async_trait]
pub trait ReceiptStore: Send + Sync {
    /// All receipts stored for a user; empty if there are none
    async fn load(&self, user_id: &str) -> Result<UserReceipts>;

    /// Append a receipt and return its generated key
    async fn push(&self, user_id: &str, receipt: &ScanReceipt) -> Result<String>;
}

/// Storage path for a user's receipts
#[must_use]
pub fn user_path(user_id: &str) -> String {
    format!("receipt/{user_id}")
}
