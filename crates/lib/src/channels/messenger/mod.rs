//! Facebook Messenger Platform: webhook callback model, send API model and client,
//! and the emitter that paces conversational acts into send API calls.

mod callback;
mod client;
mod emitter;
mod send;

pub use callback::{InboundCallback, InboundEntry, InboundMessage, MessagingEvent, Participant};
pub use client::{Delivery, DeliveryError, SendApiClient};
pub use emitter::MessengerEmitter;
pub use send::{Attachment, AttachmentPayload, OutboundMessage, OutboundPayload, QuickReply, Recipient, SenderAction};

/// Platform tag passed to the conversation engine, distinguishing this integration from others sharing it.
pub const PLATFORM: &str = "facebook-messenger";

/// `object` value Messenger puts on page webhook callbacks.
pub const PAGE_OBJECT: &str = "page";

#[cfg(test)]
pub(crate) mod test_support {
    use super::{Delivery, DeliveryError, OutboundMessage};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Records every delivered message with the (tokio) instant it was sent.
    #[derive(Default)]
    pub(crate) struct RecordingDelivery {
        pub(crate) sent: Mutex<Vec<(Instant, OutboundMessage)>>,
        /// When true, every delivery is recorded and then fails.
        pub(crate) fail: bool,
    }

    impl RecordingDelivery {
        pub(crate) fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub(crate) fn messages(&self) -> Vec<OutboundMessage> {
            self.sent.lock().unwrap().iter().map(|(_, m)| m.clone()).collect()
        }

        pub(crate) fn instants(&self) -> Vec<Instant> {
            self.sent.lock().unwrap().iter().map(|(t, _)| *t).collect()
        }
    }

    #[async_trait]
    impl Delivery for RecordingDelivery {
        async fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
            self.sent.lock().unwrap().push((Instant::now(), message.clone()));
            if self.fail {
                return Err(DeliveryError::NotConfigured);
            }
            Ok(())
        }
    }
}
