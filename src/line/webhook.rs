//! LINE webhook payload types
//!
//! Only the fields the bot acts on are modeled; everything else in the
//! payload is ignored. Unknown event and message types deserialize to
//! `Other` instead of failing the whole batch.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::signature;
use crate::{Error, Result};

/// Webhook request body
#[derive(Debug, Deserialize)]
pub struct CallbackRequest {
    /// Bot user ID that received the events
    #[serde(default)]
    pub destination: String,

    /// Events in arrival order
    pub events: Vec<Event>,
}

/// A single webhook event
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Message(MessageEvent),
    Follow(FollowEvent),
    Postback(PostbackEvent),
    Beacon(BeaconEvent),
    /// Any event type the bot does not handle (unfollow, join, ...)
    #[serde(other)]
    Other,
}

impl Event {
    /// Short name for logging
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::Follow(_) => "follow",
            Self::Postback(_) => "postback",
            Self::Beacon(_) => "beacon",
            Self::Other => "other",
        }
    }
}

/// Message event
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    /// Absent when the channel is in standby mode
    pub reply_token: Option<String>,
    pub source: Option<Source>,
    /// Milliseconds since the epoch
    #[serde(default)]
    pub timestamp: i64,
    pub message: MessageContent,
}

impl MessageEvent {
    /// Time the platform received the message
    #[must_use]
    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// Sender's user ID, empty if the source carries none
    #[must_use]
    pub fn user_id(&self) -> &str {
        self.source.as_ref().map_or("", Source::user_id)
    }
}

/// Message content by type
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    Text { id: String, text: String },
    Image { id: String },
    Video { id: String },
    /// Sticker, audio, location, file, ...
    #[serde(other)]
    Other,
}

/// Follow event
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowEvent {
    pub reply_token: Option<String>,
    pub source: Option<Source>,
}

/// Postback event
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostbackEvent {
    pub reply_token: Option<String>,
    pub source: Option<Source>,
    pub postback: PostbackContent,
}

/// Postback payload
#[derive(Debug, Deserialize)]
pub struct PostbackContent {
    pub data: String,
}

/// Beacon event
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconEvent {
    pub reply_token: Option<String>,
    pub source: Option<Source>,
    pub beacon: BeaconContent,
}

/// Beacon payload
#[derive(Debug, Deserialize)]
pub struct BeaconContent {
    pub hwid: String,
    /// `enter`, `banner` or `stay`
    #[serde(rename = "type")]
    pub beacon_type: String,
}

/// Where an event came from
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Source {
    #[serde(rename_all = "camelCase")]
    User { user_id: String },
    #[serde(rename_all = "camelCase")]
    Group {
        group_id: String,
        user_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Room {
        room_id: String,
        user_id: Option<String>,
    },
}

impl Source {
    /// User ID of the sender; empty for group/room events without one
    #[must_use]
    pub fn user_id(&self) -> &str {
        match self {
            Self::User { user_id } => user_id,
            Self::Group { user_id, .. } | Self::Room { user_id, .. } => {
                user_id.as_deref().unwrap_or_default()
            }
        }
    }
}

/// Verify the signature and parse a webhook body
///
/// # Errors
///
/// Returns `Error::InvalidSignature` if the signature is missing or does not
/// match, and `Error::Payload` if the body is not a valid webhook payload
pub fn parse_request(
    channel_secret: &str,
    body: &[u8],
    signature: Option<&str>,
) -> Result<CallbackRequest> {
    let Some(sig) = signature else {
        return Err(Error::InvalidSignature);
    };

    if !signature::verify(channel_secret, body, sig) {
        return Err(Error::InvalidSignature);
    }

    serde_json::from_slice(body).map_err(|e| Error::Payload(e.to_string()))
}
