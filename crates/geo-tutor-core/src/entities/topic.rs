use std::future::Future;
use std::str::FromStr;

use chrono::Utc;
use uuid::Uuid;

use crate::entities::dao::{NewTopic, TopicRecord};
use crate::entities::{SqliteStore, parse_timestamp};
use crate::types::Difficulty;

/// Read-mostly topic catalog.
pub trait TopicStore: Send + Sync + 'static {
    /// All topics in insertion order.
    fn list_topics(&self) -> impl Future<Output = Result<Vec<TopicRecord>, sqlx::Error>> + Send;

    fn has_topics(&self) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    fn count_topics(&self) -> impl Future<Output = Result<i64, sqlx::Error>> + Send;

    /// Insert every topic in one transaction.
    fn insert_topics(
        &self,
        topics: &[NewTopic],
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

type TopicRow = (String, String, String, String, String, String);

impl TopicStore for SqliteStore {
    async fn list_topics(&self) -> Result<Vec<TopicRecord>, sqlx::Error> {
        let rows: Vec<TopicRow> = sqlx::query_as(
            "SELECT id, name, description, difficulty, sample_questions, created_at \
             FROM geography_topics ORDER BY rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(
                |(id, name, description, difficulty, sample_questions, created_at)| TopicRecord {
                    difficulty: Difficulty::from_str(&difficulty).unwrap_or_else(|_| {
                        tracing::warn!(topic = %name, raw = %difficulty, "unknown topic difficulty; using medium");
                        Difficulty::Medium
                    }),
                    sample_questions: serde_json::from_str(&sample_questions).unwrap_or_else(
                        |e| {
                            tracing::warn!(topic = %name, error = %e, "malformed sample_questions column");
                            Vec::new()
                        },
                    ),
                    created_at: parse_timestamp(&created_at, "topic"),
                    id,
                    name,
                    description,
                },
            )
            .collect())
    }

    async fn has_topics(&self) -> Result<bool, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as("SELECT id FROM geography_topics LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn count_topics(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM geography_topics")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert_topics(&self, topics: &[NewTopic]) -> Result<(), sqlx::Error> {
        let created_at = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;
        for topic in topics {
            let samples = serde_json::to_string(topic.sample_questions)
                .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
            sqlx::query(
                "INSERT INTO geography_topics (id, name, description, difficulty, sample_questions, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(topic.name)
            .bind(topic.description)
            .bind(topic.difficulty.as_ref())
            .bind(&samples)
            .bind(&created_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::memory_store;

    const CAPITALS: NewTopic = NewTopic {
        name: "World Capitals",
        description: "Capital cities",
        difficulty: Difficulty::Easy,
        sample_questions: &["What is the capital of Australia?", "What is the capital of Brazil?"],
    };

    const OCEANS: NewTopic = NewTopic {
        name: "Oceans & Seas",
        description: "Bodies of water",
        difficulty: Difficulty::Medium,
        sample_questions: &["What are the five major oceans?"],
    };

    #[tokio::test]
    async fn empty_catalog_has_no_topics() {
        let store = memory_store().await;
        assert!(!store.has_topics().await.unwrap());
        assert!(store.list_topics().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn inserted_topics_list_in_order_with_samples() {
        let store = memory_store().await;
        store.insert_topics(&[CAPITALS, OCEANS]).await.unwrap();

        let topics = store.list_topics().await.unwrap();
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].name, "World Capitals");
        assert_eq!(topics[0].difficulty, Difficulty::Easy);
        assert_eq!(
            topics[0].sample_questions,
            vec!["What is the capital of Australia?", "What is the capital of Brazil?"]
        );
        assert_eq!(topics[1].name, "Oceans & Seas");
        assert!(store.has_topics().await.unwrap());
        assert_eq!(store.count_topics().await.unwrap(), 2);
    }
}
