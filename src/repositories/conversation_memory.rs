use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::domain::ChatMessage;

pub const DEFAULT_MAX_MESSAGES: usize = 10;

/// Per-conversation message window fed back to the model on each turn.
#[async_trait]
pub trait ConversationMemory: Send + Sync {
    async fn append(&self, conversation_id: &str, message: ChatMessage);
    /// Retained messages, oldest first.
    async fn recent(&self, conversation_id: &str) -> Vec<ChatMessage>;
}

pub struct InMemoryConversationMemory {
    windows: RwLock<HashMap<String, VecDeque<ChatMessage>>>,
    max_messages: usize,
}

impl InMemoryConversationMemory {
    pub fn new(max_messages: usize) -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
            max_messages: max_messages.max(1),
        }
    }
}

impl Default for InMemoryConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGES)
    }
}

#[async_trait]
impl ConversationMemory for InMemoryConversationMemory {
    async fn append(&self, conversation_id: &str, message: ChatMessage) {
        let mut windows = self.windows.write().await;
        let window = windows.entry(conversation_id.to_string()).or_default();
        while window.len() >= self.max_messages {
            window.pop_front();
        }
        window.push_back(message);
    }

    async fn recent(&self, conversation_id: &str) -> Vec<ChatMessage> {
        let windows = self.windows.read().await;
        windows
            .get(conversation_id)
            .map(|window| window.iter().cloned().collect())
            .unwrap_or_default()
    }
}
