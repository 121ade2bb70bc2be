//! Demo conversation: greet with quick replies, send a picture on "Yes", then start over.

use async_trait::async_trait;
use messenger::emission::{EmissionAction, EmitError, Emitter};
use messenger::engine::{State, StateMachine, Traverser, START_STATE};
use std::sync::Arc;

const PICTURE_STATE: &str = "picture";
const PICTURE_URL: &str = "https://upload.wikimedia.org/wikipedia/commons/3/3a/Cat03.jpg";

pub struct DemoConversation;

impl StateMachine for DemoConversation {
    fn states(&self) -> Vec<Arc<dyn State>> {
        vec![Arc::new(Start), Arc::new(Picture)]
    }
}

struct Start;

#[async_trait]
impl State for Start {
    fn slug(&self) -> &str {
        START_STATE
    }

    async fn enter(&self, emitter: &dyn Emitter, _traverser: &mut Traverser) -> Result<(), EmitError> {
        emitter.emit(EmissionAction::text("Hi there!")).await?;
        emitter
            .emit(EmissionAction::quick_replies("Want to see a cat?", ["Yes", "No"]))
            .await
    }

    fn transition(&self, input: &str, _traverser: &Traverser) -> Option<String> {
        input
            .trim()
            .eq_ignore_ascii_case("yes")
            .then(|| PICTURE_STATE.to_string())
    }

    async fn react(&self, _input: &str, emitter: &dyn Emitter, _traverser: &mut Traverser) -> Result<(), EmitError> {
        emitter
            .emit(EmissionAction::quick_replies("No problem. Change your mind?", ["Yes", "No"]))
            .await
    }
}

struct Picture;

#[async_trait]
impl State for Picture {
    fn slug(&self) -> &str {
        PICTURE_STATE
    }

    async fn enter(&self, emitter: &dyn Emitter, _traverser: &mut Traverser) -> Result<(), EmitError> {
        emitter.emit(EmissionAction::image(PICTURE_URL)).await?;
        emitter.emit(EmissionAction::text("Say anything to start over.")).await
    }

    fn transition(&self, _input: &str, _traverser: &Traverser) -> Option<String> {
        Some(START_STATE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use messenger::engine::{build_state_map, ConversationEngine, ConversationStore, FsmEngine, MemoryStore};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<EmissionAction>>);

    #[async_trait]
    impl Emitter for Collect {
        async fn emit(&self, action: EmissionAction) -> Result<(), EmitError> {
            self.0.lock().unwrap().push(action);
            Ok(())
        }
    }

    #[tokio::test]
    async fn yes_leads_to_picture_and_back() {
        let states = build_state_map(&DemoConversation);
        let store = MemoryStore::new();
        let out = Collect::default();
        for text in ["hello", "yes", "thanks"] {
            FsmEngine
                .step("test", "U1", text, &store, &out, &states)
                .await
                .unwrap();
        }
        let kinds: Vec<String> = out.0.lock().unwrap().iter().map(|a| a.kind().to_string()).collect();
        assert_eq!(
            kinds,
            ["text", "quick_reply_set", "image", "text", "text", "quick_reply_set"]
        );
        assert_eq!(store.fetch("test", "U1").await.unwrap().current_state, START_STATE);
    }
}
