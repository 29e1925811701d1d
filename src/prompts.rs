//! Fixed prompts sent to the model

/// Vision prompt: turn a receipt photo into JSON
pub const RECEIPT_IMAGE_PROMPT: &str = r#"This is a receipt, and you are a secretary.
Please organize the details from the receipt into JSON format for me.
I only need the JSON representation of the receipt data. Eventually,
I will need to input it into a database with the following structure:

 Receipt(ReceiptID, PurchaseStore, PurchaseDate, PurchaseAddress, TotalAmount) and
 Items(ItemID, ReceiptID, ItemName, ItemPrice).

Data format as follow:
- ReceiptID, using PurchaseDate, but Represent the year, month, day, hour, and minute without any separators.
- ItemID, using ReceiptID and sequel number in that receipt.
Otherwise, if any information is unclear, fill in with "N/A".
"#;

/// Text prompt: annotate Korean text in the receipt JSON with Chinese
pub const TRANSLATE_PROMPT: &str = "
This is a JSON representation of a receipt.
Please translate the Korean characters into Chinese for me.
Using format as follow:
    Korean(Chinese)
All the Chinese will use in zh_tw.
Please response with the translated JSON.";

/// Build the translation prompt for a first-pass receipt
#[must_use]
pub fn translate_prompt(receipt_text: &str) -> String {
    format!("{TRANSLATE_PROMPT} \n --- \n {receipt_text}")
}

/// Build the question prompt over a user's stored receipts
#[must_use]
pub fn search_receipts_prompt(receipts_json: &str, question: &str) -> String {
    format!(
        "\nHere is my entire shopping list {receipts_json}; \n\
         please answer my question based on this information. {question}. \n\
         Reply in zh_tw.\n"
    )
}
