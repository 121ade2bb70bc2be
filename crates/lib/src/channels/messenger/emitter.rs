//! Messenger emitter: turns emission actions into send API calls for one recipient.
//!
//! Every content act (text, media, quick replies) is sent as typing-on, a pause, then the
//! content itself, in that order, within the calling task. The pause suspends only that task.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::client::Delivery;
use super::send::{OutboundMessage, SenderAction};
use crate::emission::{EmissionAction, EmitError, Emitter};

/// Emitter bound to one Messenger user (page-scoped id).
#[derive(Clone)]
pub struct MessengerEmitter {
    recipient_id: String,
    delivery: Arc<dyn Delivery>,
    typing_delay: Duration,
}

impl MessengerEmitter {
    pub fn new(recipient_id: impl Into<String>, delivery: Arc<dyn Delivery>, typing_delay: Duration) -> Self {
        Self {
            recipient_id: recipient_id.into(),
            delivery,
            typing_delay,
        }
    }

    pub fn recipient_id(&self) -> &str {
        &self.recipient_id
    }

    /// Map a content act to its send API request. Non-content acts return None.
    fn content_message(&self, action: &EmissionAction) -> Option<OutboundMessage> {
        let to = self.recipient_id.as_str();
        let message = match action {
            EmissionAction::Text(text) => OutboundMessage::text(to, text.as_str()),
            EmissionAction::Audio { url } => OutboundMessage::attachment(to, "audio", url.as_str()),
            EmissionAction::File { url } => OutboundMessage::attachment(to, "file", url.as_str()),
            EmissionAction::Image { url } => OutboundMessage::attachment(to, "image", url.as_str()),
            EmissionAction::Video { url } => OutboundMessage::attachment(to, "video", url.as_str()),
            EmissionAction::QuickReplySet { prompt, options } => {
                OutboundMessage::quick_replies(to, prompt.as_str(), options)
            }
            EmissionAction::TypingIndicator(_)
            | EmissionAction::Delay(_)
            | EmissionAction::Custom { .. } => return None,
        };
        Some(message)
    }
}

#[async_trait]
impl Emitter for MessengerEmitter {
    async fn emit(&self, action: EmissionAction) -> Result<(), EmitError> {
        if let Some(message) = self.content_message(&action) {
            // Indicator failures do not stop the content itself.
            if let Err(e) = self.emit(EmissionAction::TypingIndicator(true)).await {
                log::warn!("messenger: typing indicator for {} dropped: {}", action.kind(), e);
            }
            self.emit(EmissionAction::Delay(self.typing_delay)).await?;
            return self.delivery.deliver(&message).await.map_err(|e| {
                log::warn!("messenger: {} delivery failed: {}", action.kind(), e);
                EmitError::from(e)
            });
        }

        match action {
            EmissionAction::TypingIndicator(enabled) => {
                let sender_action = if enabled {
                    SenderAction::TypingOn
                } else {
                    SenderAction::TypingOff
                };
                let message = OutboundMessage::sender_action(self.recipient_id.as_str(), sender_action);
                self.delivery.deliver(&message).await?;
                Ok(())
            }
            EmissionAction::Delay(duration) => {
                tokio::time::sleep(duration).await;
                Ok(())
            }
            other => {
                log::warn!("messenger: unsupported emission action kind `{}`", other.kind());
                Err(EmitError::UnsupportedActionKind(other.kind().to_string()))
            }
        }
    }
}
