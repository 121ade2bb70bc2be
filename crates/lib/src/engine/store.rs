//! Conversation store: where each user's position in the state machine lives between steps.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A user's position in the conversation: current state slug plus free-form data states may keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Traverser {
    pub platform: String,
    pub user_id: String,
    pub current_state: String,
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
}

impl Traverser {
    pub fn new(platform: impl Into<String>, user_id: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            user_id: user_id.into(),
            current_state: state.into(),
            data: HashMap::new(),
        }
    }
}

/// Persistent traverser storage. Shared by every dispatched step, so implementations
/// must be safe for concurrent use.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn fetch(&self, platform: &str, user_id: &str) -> Option<Traverser>;
    async fn save(&self, traverser: Traverser);
}

/// Key for a traverser: platform + user id.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct TraverserKey {
    platform: String,
    user_id: String,
}

/// In-memory store; contents are lost on restart.
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<TraverserKey, Traverser>>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn fetch(&self, platform: &str, user_id: &str) -> Option<Traverser> {
        let key = TraverserKey {
            platform: platform.to_string(),
            user_id: user_id.to_string(),
        };
        self.inner.read().await.get(&key).cloned()
    }

    async fn save(&self, traverser: Traverser) {
        let key = TraverserKey {
            platform: traverser.platform.clone(),
            user_id: traverser.user_id.clone(),
        };
        self.inner.write().await.insert(key, traverser);
    }
}
