use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Ordering, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One turn of a conversation. Persisted rows also carry `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::turn(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::turn(ChatRole::Assistant, content)
    }

    fn turn(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: None,
            role,
            content: content.into(),
            created_at: None,
        }
    }

    pub fn to_row(&self, user_id: &str) -> serde_json::Value {
        serde_json::json!({
            "user_id": user_id,
            "role": self.role,
            "content": self.content,
        })
    }
}

impl Record for ChatMessage {
    const TABLE: &'static str = "chat_messages";
    const ORDER: Ordering = Ordering::asc("created_at");

    fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}
