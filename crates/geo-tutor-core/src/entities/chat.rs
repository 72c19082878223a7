use std::future::Future;

use crate::entities::{SqliteStore, dao::ChatExchange, parse_timestamp};

/// Append-only per-user log of question/answer exchanges.
pub trait ChatStore: Send + Sync + 'static {
    fn append_exchange(
        &self,
        exchange: ChatExchange,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

    /// Most recent exchanges for `user_id`, newest first, at most `limit` rows.
    fn list_recent_exchanges(
        &self,
        user_id: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<ChatExchange>, sqlx::Error>> + Send;

    fn count_exchanges(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<i64, sqlx::Error>> + Send;
}

type ExchangeRow = (
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    String,
);

impl ChatStore for SqliteStore {
    async fn append_exchange(&self, exchange: ChatExchange) -> Result<(), sqlx::Error> {
        let created_at = exchange.created_at.to_rfc3339();
        sqlx::query(
            "INSERT INTO chat_messages (id, user_id, message, response, topic, difficulty, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&exchange.id)
        .bind(&exchange.user_id)
        .bind(&exchange.message)
        .bind(&exchange.response)
        .bind(&exchange.topic)
        .bind(&exchange.difficulty)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_recent_exchanges(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<ChatExchange>, sqlx::Error> {
        // rowid follows insertion order, which is what "most recent" means
        // here; created_at can tie within the same instant.
        let rows: Vec<ExchangeRow> = sqlx::query_as(
            "SELECT id, user_id, message, response, topic, difficulty, created_at \
             FROM chat_messages WHERE user_id = ?1 ORDER BY rowid DESC LIMIT ?2",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(
                |(id, user_id, message, response, topic, difficulty, created_at)| ChatExchange {
                    id,
                    user_id,
                    message,
                    response,
                    topic,
                    difficulty,
                    created_at: parse_timestamp(&created_at, "message"),
                },
            )
            .collect())
    }

    async fn count_exchanges(&self, user_id: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM chat_messages WHERE user_id = ?1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
