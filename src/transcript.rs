use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

/// One exchange unit as rendered by the UI boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: i64,
}

impl ChatTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Session-scoped ordered turn log. No persistence: cleared turns are gone.
#[derive(Default)]
pub struct Transcript {
    turns: RwLock<Vec<ChatTurn>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, turn: ChatTurn) {
        self.turns.write().await.push(turn);
    }

    /// Append a user/bot turn pair under one write lock so concurrent
    /// pipeline runs for the same session cannot interleave pairs.
    pub async fn append_pair(&self, user: ChatTurn, bot: ChatTurn) {
        let mut turns = self.turns.write().await;
        turns.push(user);
        turns.push(bot);
    }

    pub async fn clear(&self) {
        self.turns.write().await.clear();
    }

    pub async fn all(&self) -> Vec<ChatTurn> {
        self.turns.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.turns.read().await.len()
    }
}
