//! Inbound webhook payload (POST body Messenger sends for page events).

use serde::{Deserialize, Deserializer};

/// Missing and explicit `null` both decode to the field's default, so one null field
/// does not cost the whole batch.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Root of a webhook POST body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundCallback {
    #[serde(default, deserialize_with = "null_as_default")]
    pub object: String,
    #[serde(default, deserialize_with = "null_as_default", rename = "entry")]
    pub entries: Vec<InboundEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// Epoch milliseconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: i64,
    #[serde(default, deserialize_with = "null_as_default", rename = "messaging")]
    pub messaging_events: Vec<MessagingEvent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagingEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub sender: Participant,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recipient: Participant,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: i64,
    /// Absent for deliveries, reads, and other non-message events.
    #[serde(default)]
    pub message: Option<InboundMessage>,
}

impl MessagingEvent {
    /// Message text, or empty when the event carries no text.
    pub fn text(&self) -> &str {
        self.message
            .as_ref()
            .and_then(|m| m.text.as_deref())
            .unwrap_or("")
    }
}

/// Page-scoped id of a sender or recipient.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Participant {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundMessage {
    #[serde(default, deserialize_with = "null_as_default", rename = "mid")]
    pub message_id: String,
    #[serde(default, deserialize_with = "null_as_default", rename = "seq")]
    pub sequence: i64,
    #[serde(default)]
    pub text: Option<String>,
}

impl InboundCallback {
    /// All messaging events across entries, in payload order.
    pub fn messaging_events(&self) -> impl Iterator<Item = &MessagingEvent> {
        self.entries.iter().flat_map(|e| e.messaging_events.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "object": "page",
        "entry": [{
            "id": "PAGE1",
            "time": 1458692752478,
            "messaging": [
                {
                    "sender": {"id": "U1"},
                    "recipient": {"id": "PAGE1"},
                    "timestamp": 1458692752478,
                    "message": {"mid": "mid.1", "seq": 73, "text": "hi"}
                },
                {
                    "sender": {"id": "U2"},
                    "recipient": {"id": "PAGE1"},
                    "timestamp": 1458692752479,
                    "delivery": {"watermark": 1458668856253}
                }
            ]
        }]
    }"#;

    #[test]
    fn parses_page_callback() {
        let cb: InboundCallback = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(cb.object, "page");
        assert_eq!(cb.entries.len(), 1);
        let entry = &cb.entries[0];
        assert_eq!(entry.id, "PAGE1");
        assert_eq!(entry.time, 1458692752478);
        let first = &entry.messaging_events[0];
        assert_eq!(first.sender.id, "U1");
        assert_eq!(first.recipient.id, "PAGE1");
        let msg = first.message.as_ref().unwrap();
        assert_eq!(msg.message_id, "mid.1");
        assert_eq!(msg.sequence, 73);
        assert_eq!(first.text(), "hi");
    }

    #[test]
    fn event_without_message_has_empty_text() {
        let cb: InboundCallback = serde_json::from_str(SAMPLE).unwrap();
        let events: Vec<_> = cb.messaging_events().collect();
        assert_eq!(events.len(), 2);
        assert!(events[1].message.is_none());
        assert_eq!(events[1].text(), "");
    }

    #[test]
    fn missing_sender_defaults_to_empty_id() {
        let cb: InboundCallback =
            serde_json::from_str(r#"{"object":"page","entry":[{"messaging":[{"message":{"text":"x"}}]}]}"#)
                .unwrap();
        let event = cb.messaging_events().next().unwrap();
        assert_eq!(event.sender.id, "");
        assert_eq!(event.text(), "x");
    }

    #[test]
    fn null_messaging_in_one_entry_keeps_other_entries() {
        let cb: InboundCallback = serde_json::from_str(
            r#"{"object":"page","entry":[
                {"id":"P","time":1,"messaging":[{"sender":{"id":"U1"},"message":{"text":"hi"}}]},
                {"id":null,"time":null,"messaging":null}
            ]}"#,
        )
        .unwrap();
        assert_eq!(cb.entries.len(), 2);
        assert!(cb.entries[1].messaging_events.is_empty());
        let events: Vec<_> = cb.messaging_events().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].sender.id, "U1");
    }

    #[test]
    fn null_scalars_decode_to_defaults() {
        let cb: InboundCallback = serde_json::from_str(
            r#"{"object":null,"entry":[{"messaging":[{
                "sender":{"id":"U1"},"recipient":null,"timestamp":null,
                "message":{"mid":null,"seq":null,"text":"hi"}
            }]}]}"#,
        )
        .unwrap();
        assert_eq!(cb.object, "");
        let event = cb.messaging_events().next().unwrap();
        assert_eq!(event.recipient.id, "");
        let msg = event.message.as_ref().unwrap();
        assert_eq!(msg.message_id, "");
        assert_eq!(msg.sequence, 0);
        assert_eq!(event.text(), "hi");
    }

    #[test]
    fn null_entry_list_is_empty() {
        let cb: InboundCallback = serde_json::from_str(r#"{"object":"page","entry":null}"#).unwrap();
        assert_eq!(cb.messaging_events().count(), 0);
    }
}
