//! Send API request body.
//!
//! One request carries either a `sender_action` (typing indicator) or a `message`, never both.
//! `message` is serialized as `null` for sender-action requests.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub recipient: Recipient,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_action: Option<SenderAction>,
    #[serde(default)]
    pub message: Option<OutboundPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderAction {
    TypingOn,
    TypingOff,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutboundPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_replies: Vec<QuickReply>,
}

/// Media attachment; `kind` is one of "audio", "file", "image", "video".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: AttachmentPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentPayload {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    pub content_type: String,
    pub title: String,
    pub payload: String,
}

impl QuickReply {
    /// Text quick reply whose title and payload are both `option`.
    pub fn text(option: impl Into<String>) -> Self {
        let option = option.into();
        Self {
            content_type: "text".to_string(),
            title: option.clone(),
            payload: option,
        }
    }
}

impl OutboundMessage {
    pub fn sender_action(recipient_id: impl Into<String>, action: SenderAction) -> Self {
        Self {
            recipient: Recipient { id: recipient_id.into() },
            sender_action: Some(action),
            message: None,
        }
    }

    pub fn text(recipient_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_payload(
            recipient_id,
            OutboundPayload {
                text: Some(text.into()),
                ..Default::default()
            },
        )
    }

    pub fn attachment(recipient_id: impl Into<String>, kind: &str, url: impl Into<String>) -> Self {
        Self::with_payload(
            recipient_id,
            OutboundPayload {
                attachment: Some(Attachment {
                    kind: kind.to_string(),
                    payload: AttachmentPayload { url: url.into() },
                }),
                ..Default::default()
            },
        )
    }

    pub fn quick_replies(recipient_id: impl Into<String>, prompt: impl Into<String>, options: &[String]) -> Self {
        Self::with_payload(
            recipient_id,
            OutboundPayload {
                text: Some(prompt.into()),
                quick_replies: options.iter().map(QuickReply::text).collect(),
                ..Default::default()
            },
        )
    }

    fn with_payload(recipient_id: impl Into<String>, payload: OutboundPayload) -> Self {
        Self {
            recipient: Recipient { id: recipient_id.into() },
            sender_action: None,
            message: Some(payload),
        }
    }
}
