//! Emission actions: platform-independent conversational acts produced by the engine,
//! and the `Emitter` trait that turns them into platform calls.

use async_trait::async_trait;
use std::time::Duration;

use crate::channels::messenger::DeliveryError;

/// One conversational act. Each platform emitter maps these onto its own API.
#[derive(Debug, Clone, PartialEq)]
pub enum EmissionAction {
    Text(String),
    Audio { url: String },
    File { url: String },
    Image { url: String },
    Video { url: String },
    /// A prompt with tappable options; each option is both label and value.
    QuickReplySet { prompt: String, options: Vec<String> },
    TypingIndicator(bool),
    Delay(Duration),
    /// Acts some platforms support and others do not (e.g. carousels). Emitters that do not
    /// know `kind` reject it.
    Custom {
        kind: String,
        payload: serde_json::Value,
    },
}

impl EmissionAction {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self::Image { url: url.into() }
    }

    pub fn quick_replies<I, S>(prompt: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::QuickReplySet {
            prompt: prompt.into(),
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// Short name of the act, used in logs and in `UnsupportedActionKind`.
    pub fn kind(&self) -> &str {
        match self {
            Self::Text(_) => "text",
            Self::Audio { .. } => "audio",
            Self::File { .. } => "file",
            Self::Image { .. } => "image",
            Self::Video { .. } => "video",
            Self::QuickReplySet { .. } => "quick_reply_set",
            Self::TypingIndicator(_) => "typing_indicator",
            Self::Delay(_) => "delay",
            Self::Custom { kind, .. } => kind,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("emitter cannot handle action kind `{0}`")]
    UnsupportedActionKind(String),
    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

/// Sink for emission actions, bound to one conversation.
#[async_trait]
pub trait Emitter: Send + Sync {
    async fn emit(&self, action: EmissionAction) -> Result<(), EmitError>;
}
