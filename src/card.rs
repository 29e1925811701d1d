//! Receipt cards rendered as Flex messages

use crate::line::message::{
    FlexBlockStyle, FlexBox, FlexBubble, FlexBubbleStyles, FlexCarousel, FlexComponent,
    FlexContainer, FlexSeparator, FlexText, Message,
};
use crate::receipt::ScanReceipt;

/// Fallback text for clients that cannot render Flex messages
pub const ALT_TEXT: &str = "請到手機上查看名片資訊";

const HEADER_COLOR: &str = "#1DB446";
const MUTED_COLOR: &str = "#aaaaaa";
const ITEM_NAME_COLOR: &str = "#555555";
const ITEM_PRICE_COLOR: &str = "#111111";

/// Shown in place of values the model left empty; Flex rejects empty text
const PLACEHOLDER: &str = "N/A";

/// Display values for one card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardData {
    pub store: String,
    pub address: String,
    pub receipt_id: String,
    /// `(name, formatted price)` rows
    pub items: Vec<(String, String)>,
}

impl CardData {
    /// Fixed data shown for the trigger keyword
    #[must_use]
    pub fn sample() -> Self {
        Self {
            store: "7-Eleven".to_string(),
            address: "No. 1, Songren Rd., Xinyi Dist., Taipei City 110, Taiwan (R.O.C.)"
                .to_string(),
            receipt_id: "202109151200".to_string(),
            items: vec![
                ("Item1".to_string(), "$100".to_string()),
                ("Item2".to_string(), "$200".to_string()),
            ],
        }
    }

    /// Display values for a parsed receipt
    #[must_use]
    pub fn from_receipt(receipt: &ScanReceipt) -> Self {
        Self {
            store: or_placeholder(&receipt.receipt.purchase_store),
            address: or_placeholder(&receipt.receipt.purchase_address),
            receipt_id: or_placeholder(&receipt.receipt.receipt_id),
            items: receipt
                .items
                .iter()
                .map(|item| (or_placeholder(&item.item_name), format!("${},", item.item_price)))
                .collect(),
        }
    }
}

fn or_placeholder(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        value.to_string()
    }
}

/// Card for the trigger keyword
#[must_use]
pub fn sample_card() -> Message {
    receipt_card(&CardData::sample())
}

/// Flex message for one receipt: a single bubble in a carousel
#[must_use]
pub fn receipt_card(data: &CardData) -> Message {
    let rows: Vec<FlexComponent> = data
        .items
        .iter()
        .map(|(name, price)| {
            FlexBox::horizontal(vec![
                FlexText::new(name.as_str())
                    .size("sm")
                    .color(ITEM_NAME_COLOR)
                    .flex(0)
                    .into(),
                FlexText::new(price.as_str())
                    .size("sm")
                    .color(ITEM_PRICE_COLOR)
                    .align("end")
                    .into(),
            ])
            .into()
        })
        .collect();

    let body = FlexBox::vertical(vec![
        FlexText::new("RECEIPT")
            .bold()
            .color(HEADER_COLOR)
            .size("sm")
            .into(),
        FlexText::new(data.store.as_str())
            .bold()
            .size("xxl")
            .margin("md")
            .into(),
        FlexText::new(data.address.as_str())
            .size("xs")
            .color(MUTED_COLOR)
            .wrap()
            .into(),
        FlexSeparator::with_margin("xxl").into(),
        FlexBox::vertical(rows).margin("xxl").spacing("sm").into(),
        FlexSeparator::with_margin("xxl").into(),
        FlexBox::horizontal(vec![
            FlexText::new("RECEIPT ID")
                .size("xs")
                .color(MUTED_COLOR)
                .flex(0)
                .into(),
            FlexText::new(data.receipt_id.as_str())
                .color(MUTED_COLOR)
                .size("xs")
                .align("end")
                .into(),
        ])
        .margin("md")
        .into(),
    ]);

    let bubble = FlexBubble {
        body: Some(body),
        styles: Some(FlexBubbleStyles {
            footer: Some(FlexBlockStyle { separator: true }),
        }),
    };

    Message::flex(
        ALT_TEXT,
        FlexContainer::Carousel(FlexCarousel {
            contents: vec![bubble],
        }),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::receipt::{Item, Receipt};

    fn texts(message: &Message) -> Vec<String> {
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
        walk(&serde_json::to_value(message).unwrap()["contents"], &mut out);
        out
    }

    #[test]
    fn sample_card_contents() {
        let card = sample_card();
        let Message::Flex { alt_text, .. } = &card else {
            panic!("expected flex");
        };
        assert_eq!(alt_text, ALT_TEXT);

        let texts = texts(&card);
        for expected in ["RECEIPT", "7-Eleven", "Item1", "$100", "Item2", "$200", "202109151200"] {
            assert!(texts.iter().any(|t| t == expected), "missing {expected}");
        }
    }

    #[test]
    fn receipt_prices_have_trailing_comma() {
        let receipt = ScanReceipt {
            receipt: Receipt {
                receipt_id: "202403011230".to_string(),
                purchase_store: "Mart".to_string(),
                ..Receipt::default()
            },
            items: vec![Item {
                item_name: "Milk".to_string(),
                item_price: 50,
                ..Item::default()
            }],
        };

        let texts = texts(&receipt_card(&CardData::from_receipt(&receipt)));
        assert!(texts.iter().any(|t| t == "$50,"));
        assert!(texts.iter().any(|t| t == "Milk"));
        assert!(texts.iter().any(|t| t == "Mart"));
    }

    #[test]
    fn empty_fields_shown_as_placeholder() {
        let receipt = ScanReceipt {
            receipt: Receipt {
                purchase_store: "  ".to_string(),
                ..Receipt::default()
            },
            items: vec![Item {
                item_price: 30,
                ..Item::default()
            }],
        };

        let data = CardData::from_receipt(&receipt);
        assert_eq!(data.store, "N/A");
        assert_eq!(data.address, "N/A");
        assert_eq!(data.receipt_id, "N/A");
        assert_eq!(data.items, vec![("N/A".to_string(), "$30,".to_string())]);

        let texts = texts(&receipt_card(&data));
        assert!(texts.iter().all(|t| !t.is_empty()));
    }

    #[test]
    fn item_rows_in_order() {
        let data = CardData::sample();
        let value = serde_json::to_value(receipt_card(&data)).unwrap();
        let rows = &value["contents"]["contents"][0]["body"]["contents"][4]["contents"];
        assert_eq!(rows[0]["contents"][0]["text"], "Item1");
        assert_eq!(rows[1]["contents"][1]["text"], "$200");
        assert_eq!(rows[1]["contents"][1]["align"], "end");
    }
}
