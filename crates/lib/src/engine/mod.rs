//! Conversation engine interface and the built-in finite-state-machine engine.
//!
//! The gateway only needs `ConversationEngine::step`; how a step decides what to emit
//! is up to the engine. `FsmEngine` walks a `StateMap` built once at startup.

mod fsm;
mod store;

pub use fsm::{build_state_map, FsmEngine, State, StateMachine, StateMap, START_STATE};
pub use store::{ConversationStore, MemoryStore, Traverser};

use async_trait::async_trait;

use crate::emission::{EmitError, Emitter};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("state `{0}` is not in the state map")]
    UnknownState(String),
    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// One step of conversation logic for one inbound message.
#[async_trait]
pub trait ConversationEngine: Send + Sync {
    async fn step(
        &self,
        platform: &str,
        user_id: &str,
        text: &str,
        store: &dyn ConversationStore,
        emitter: &dyn Emitter,
        states: &StateMap,
    ) -> Result<(), StepError>;
}
