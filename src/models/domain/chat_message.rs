use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    fn with_role(role: ChatRole, content: impl Into<String>) -> Self {
        ChatMessage {
            role,
            content: content.into(),
            created_at: Some(Utc::now()),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(ChatRole::Assistant, content)
    }
}
