//! Messaging platform channels.
//!
//! Each channel owns its wire model, its send client, and its `Emitter`. Only the
//! Facebook Messenger Platform is implemented.

pub mod messenger;
