//! Outbound LINE messages
//!
//! Text messages and the subset of Flex Message components the bot renders.
//! Each struct carries its own `type` tag so containers and components
//! serialize the same way wherever they are nested.

use serde::Serialize;

/// Maximum characters LINE accepts in one text message
pub const MAX_TEXT_CHARS: usize = 5000;

/// Maximum messages in one reply
pub const MAX_REPLY_MESSAGES: usize = 5;

/// A message sent in a reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Flex {
        alt_text: String,
        contents: FlexContainer,
    },
}

impl Message {
    /// Plain text message, truncated to the platform limit
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        let mut text = text.into();
        if let Some((cut, _)) = text.char_indices().nth(MAX_TEXT_CHARS) {
            tracing::warn!(
                chars = text.chars().count(),
                limit = MAX_TEXT_CHARS,
                "truncating text message"
            );
            text.truncate(cut);
        }
        Self::Text { text }
    }

    /// Flex message with fallback text for clients that can't render it
    #[must_use]
    pub fn flex(alt_text: impl Into<String>, contents: FlexContainer) -> Self {
        Self::Flex {
            alt_text: alt_text.into(),
            contents,
        }
    }
}

/// Top-level Flex container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FlexContainer {
    Bubble(FlexBubble),
    Carousel(FlexCarousel),
}

/// Horizontally scrollable list of bubbles
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "carousel")]
pub struct FlexCarousel {
    pub contents: Vec<FlexBubble>,
}

/// Single card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "bubble")]
pub struct FlexBubble {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<FlexBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub styles: Option<FlexBubbleStyles>,
}

/// Per-block bubble styles
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlexBubbleStyles {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<FlexBlockStyle>,
}

/// Style of one bubble block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlexBlockStyle {
    pub separator: bool,
}

/// Component inside a box
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FlexComponent {
    Box(FlexBox),
    Text(FlexText),
    Separator(FlexSeparator),
}

impl From<FlexBox> for FlexComponent {
    fn from(value: FlexBox) -> Self {
        Self::Box(value)
    }
}

impl From<FlexText> for FlexComponent {
    fn from(value: FlexText) -> Self {
        Self::Text(value)
    }
}

impl From<FlexSeparator> for FlexComponent {
    fn from(value: FlexSeparator) -> Self {
        Self::Separator(value)
    }
}

/// Layout box
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "box")]
pub struct FlexBox {
    /// `horizontal`, `vertical` or `baseline`
    pub layout: &'static str,
    pub contents: Vec<FlexComponent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<&'static str>,
}

impl FlexBox {
    #[must_use]
    pub const fn vertical(contents: Vec<FlexComponent>) -> Self {
        Self {
            layout: "vertical",
            contents,
            margin: None,
            spacing: None,
        }
    }

    #[must_use]
    pub const fn horizontal(contents: Vec<FlexComponent>) -> Self {
        Self {
            layout: "horizontal",
            contents,
            margin: None,
            spacing: None,
        }
    }

    #[must_use]
    pub const fn margin(mut self, margin: &'static str) -> Self {
        self.margin = Some(margin);
        self
    }

    #[must_use]
    pub const fn spacing(mut self, spacing: &'static str) -> Self {
        self.spacing = Some(spacing);
        self
    }
}

/// Text component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "text")]
pub struct FlexText {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flex: Option<u32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub wrap: bool,
}

impl FlexText {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: None,
            color: None,
            weight: None,
            margin: None,
            align: None,
            flex: None,
            wrap: false,
        }
    }

    #[must_use]
    pub const fn size(mut self, size: &'static str) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub const fn color(mut self, color: &'static str) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.weight = Some("bold");
        self
    }

    #[must_use]
    pub const fn margin(mut self, margin: &'static str) -> Self {
        self.margin = Some(margin);
        self
    }

    #[must_use]
    pub const fn align(mut self, align: &'static str) -> Self {
        self.align = Some(align);
        self
    }

    #[must_use]
    pub const fn flex(mut self, flex: u32) -> Self {
        self.flex = Some(flex);
        self
    }

    #[must_use]
    pub const fn wrap(mut self) -> Self {
        self.wrap = true;
        self
    }
}

/// Horizontal rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "separator")]
pub struct FlexSeparator {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<&'static str>,
}

impl FlexSeparator {
    #[must_use]
    pub const fn with_margin(margin: &'static str) -> Self {
        Self {
            margin: Some(margin),
        }
    }
}
