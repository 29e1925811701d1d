//! Receipt records extracted from model output

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// A scanned receipt with its line items
///
/// Field names follow the JSON layout the extraction prompt asks for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReceipt {
    #[serde(rename = "Receipt")]
    pub receipt: Receipt,
    #[serde(rename = "Items", default, deserialize_with = "null_as_empty")]
    pub items: Vec<Item>,
}

/// Receipt header
///
/// Fields the model leaves out decode as empty or zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Receipt {
    #[serde(rename = "ReceiptID")]
    pub receipt_id: String,
    pub purchase_store: String,
    pub purchase_date: String,
    pub purchase_address: String,
    pub total_amount: i64,
}

/// One purchased item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Item {
    #[serde(rename = "ItemID")]
    pub item_id: String,
    #[serde(rename = "ReceiptID")]
    pub receipt_id: String,
    pub item_name: String,
    pub item_price: i64,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Item>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Item>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Pull the JSON document out of model output
///
/// Output wrapped in a Markdown code fence loses its opening fence line and
/// its closing fence line; anything else is returned trimmed.
#[must_use]
pub fn extract_json(output: &str) -> &str {
    let trimmed = output.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    let Some((_, rest)) = trimmed.split_once('\n') else {
        return "";
    };

    let rest = rest.trim_end();
    match rest.rsplit_once('\n') {
        Some((body, last)) if last.trim_start().starts_with("```") => body,
        None if rest.trim_start().starts_with("```") => "",
        _ => rest.strip_suffix("```").unwrap_or(rest),
    }
}

/// Parse a receipt from model output
///
/// # Errors
///
/// Returns `Error::Receipt` if the extracted text is not a receipt document
pub fn parse_receipt(output: &str) -> Result<ScanReceipt> {
    let json = extract_json(output);
    tracing::debug!(json = %json, "extracted receipt json");
    serde_json::from_str(json).map_err(|e| Error::Receipt(e.to_string()))
}
