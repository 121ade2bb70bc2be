//! Event dispatch: one unsupervised task per messaging event.
//!
//! The webhook handler calls `dispatch` and answers the platform immediately; tasks are
//! never joined. There is no ordering between events, even for the same sender.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::channels::messenger::{Delivery, InboundCallback, MessengerEmitter, SendApiClient, PLATFORM};
use crate::config::MessengerSettings;
use crate::engine::{ConversationEngine, ConversationStore, StateMap};

/// Result of one dispatched step, reported when an outcome channel is attached.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub user_id: String,
    pub text: String,
    pub result: Result<(), String>,
}

/// Everything a step needs, shared across all dispatched tasks.
#[derive(Clone)]
pub struct Dispatcher {
    engine: Arc<dyn ConversationEngine>,
    store: Arc<dyn ConversationStore>,
    states: Arc<StateMap>,
    delivery: Arc<dyn Delivery>,
    typing_delay: Duration,
    outcomes: Option<mpsc::UnboundedSender<StepOutcome>>,
}

impl Dispatcher {
    pub fn new(
        engine: Arc<dyn ConversationEngine>,
        store: Arc<dyn ConversationStore>,
        states: Arc<StateMap>,
        delivery: Arc<dyn Delivery>,
        typing_delay: Duration,
    ) -> Self {
        Self {
            engine,
            store,
            states,
            delivery,
            typing_delay,
            outcomes: None,
        }
    }

    /// Dispatcher that delivers through the Messenger send API described by `settings`.
    pub fn with_send_api(
        settings: &MessengerSettings,
        engine: Arc<dyn ConversationEngine>,
        store: Arc<dyn ConversationStore>,
        states: Arc<StateMap>,
    ) -> Self {
        let delivery = SendApiClient::new(settings.send_url.clone(), settings.access_token.clone());
        Self::new(engine, store, states, Arc::new(delivery), settings.typing_delay)
    }

    /// Report every finished step on `tx`. Does not change response latency.
    pub fn with_outcomes(mut self, tx: mpsc::UnboundedSender<StepOutcome>) -> Self {
        self.outcomes = Some(tx);
        self
    }

    /// Spawn one step per messaging event. Returns how many were scheduled.
    /// Events without a sender id are skipped.
    pub fn dispatch(&self, callback: &InboundCallback) -> usize {
        let mut scheduled = 0;
        for event in callback.messaging_events() {
            if event.sender.id.trim().is_empty() {
                log::warn!("messenger: skipping messaging event without sender id");
                continue;
            }
            // The sender id is opaque; pass it through exactly as received.
            self.spawn_step(event.sender.id.clone(), event.text().to_string());
            scheduled += 1;
        }
        log::debug!("messenger: scheduled {} step(s)", scheduled);
        scheduled
    }

    fn spawn_step(&self, user_id: String, text: String) {
        let engine = self.engine.clone();
        let store = self.store.clone();
        let states = self.states.clone();
        let outcomes = self.outcomes.clone();
        let emitter = MessengerEmitter::new(user_id.clone(), self.delivery.clone(), self.typing_delay);
        tokio::spawn(async move {
            let result = engine
                .step(PLATFORM, &user_id, &text, store.as_ref(), &emitter, &states)
                .await
                .map_err(|e| e.to_string());
            if let Err(ref e) = result {
                log::warn!("messenger: step for {} failed: {}", user_id, e);
            }
            if let Some(tx) = outcomes {
                let _ = tx.send(StepOutcome { user_id, text, result });
            }
        });
    }
}
