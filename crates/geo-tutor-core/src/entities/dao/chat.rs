use chrono::{DateTime, Utc};

/// A row in the `chat_messages` table: one question and the answer it got.
#[derive(Debug, Clone)]
pub struct ChatExchange {
    pub id: String,
    pub user_id: String,
    /// The trimmed question as the caller asked it.
    pub message: String,
    pub response: String,
    pub topic: Option<String>,
    pub difficulty: Option<String>,
    pub created_at: DateTime<Utc>,
}
