//! Finite-state-machine engine: states keyed by slug, one traverser per (platform, user).

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use super::store::{ConversationStore, Traverser};
use super::{ConversationEngine, StepError};
use crate::emission::{EmitError, Emitter};

/// Slug every new conversation starts in.
pub const START_STATE: &str = "start";

/// One state of a conversation.
#[async_trait]
pub trait State: Send + Sync {
    fn slug(&self) -> &str;

    /// Run when the traverser moves into this state (and for a brand-new user, into `start`).
    async fn enter(&self, emitter: &dyn Emitter, traverser: &mut Traverser) -> Result<(), EmitError>;

    /// Slug of the next state for this input, or None to stay.
    fn transition(&self, input: &str, traverser: &Traverser) -> Option<String>;

    /// Run when the input does not cause a transition.
    async fn react(
        &self,
        _input: &str,
        _emitter: &dyn Emitter,
        _traverser: &mut Traverser,
    ) -> Result<(), EmitError> {
        Ok(())
    }
}

/// A set of states making up one conversation design.
pub trait StateMachine {
    fn states(&self) -> Vec<Arc<dyn State>>;
}

impl StateMachine for Vec<Arc<dyn State>> {
    fn states(&self) -> Vec<Arc<dyn State>> {
        self.clone()
    }
}

/// Read-only lookup from slug to state. Built once, then shared by every step.
pub struct StateMap {
    states: HashMap<String, Arc<dyn State>>,
}

impl StateMap {
    pub fn get(&self, slug: &str) -> Option<&Arc<dyn State>> {
        self.states.get(slug)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn require(&self, slug: &str) -> Result<&Arc<dyn State>, StepError> {
        self.get(slug)
            .ok_or_else(|| StepError::UnknownState(slug.to_string()))
    }
}

/// Build the slug lookup for a state machine. When two states share a slug the first wins.
pub fn build_state_map(machine: &dyn StateMachine) -> Arc<StateMap> {
    let mut states: HashMap<String, Arc<dyn State>> = HashMap::new();
    for state in machine.states() {
        let slug = state.slug().to_string();
        if states.contains_key(&slug) {
            log::warn!("state map: duplicate state `{}` ignored", slug);
            continue;
        }
        states.insert(slug, state);
    }
    if !states.contains_key(START_STATE) {
        log::warn!("state map has no `{}` state; new conversations will fail", START_STATE);
    }
    Arc::new(StateMap { states })
}

/// Engine that walks a `StateMap`.
///
/// New user: enter `start` and stop. Known user: ask the current state for a transition;
/// on a transition enter the next state, otherwise let the current state react.
/// The traverser is saved whenever the state machine was consulted, even if emitting failed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsmEngine;

#[async_trait]
impl ConversationEngine for FsmEngine {
    async fn step(
        &self,
        platform: &str,
        user_id: &str,
        text: &str,
        store: &dyn ConversationStore,
        emitter: &dyn Emitter,
        states: &StateMap,
    ) -> Result<(), StepError> {
        let Some(mut traverser) = store.fetch(platform, user_id).await else {
            let start = states.require(START_STATE)?;
            let mut traverser = Traverser::new(platform, user_id, START_STATE);
            let entered = start.enter(emitter, &mut traverser).await;
            store.save(traverser).await;
            return entered.map_err(StepError::from);
        };

        let current = states.require(&traverser.current_state)?;
        let result = match current.transition(text, &traverser) {
            Some(next_slug) => {
                let next = states.require(&next_slug)?;
                log::debug!(
                    "fsm: {} moves {} -> {}",
                    user_id,
                    traverser.current_state,
                    next_slug
                );
                traverser.current_state = next_slug;
                next.enter(emitter, &mut traverser).await
            }
            None => current.react(text, emitter, &mut traverser).await,
        };
        store.save(traverser).await;
        result.map_err(StepError::from)
    }
}
