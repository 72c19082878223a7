use chrono::{DateTime, Utc};

use crate::types::Difficulty;

/// A row in the `geography_topics` table.
#[derive(Debug, Clone)]
pub struct TopicRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub sample_questions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Catalog entry before it has been stored.
#[derive(Debug, Clone, Copy)]
pub struct NewTopic {
    pub name: &'static str,
    pub description: &'static str,
    pub difficulty: Difficulty,
    pub sample_questions: &'static [&'static str],
}
