use geo_tutor_core::entities::{ChatExchange, TopicRecord};
use geo_tutor_core::{AskQuestion, Difficulty, SeedOutcome};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /v1/geography/ask`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AskRequest {
    /// Free-text geography question; surrounding whitespace is trimmed.
    pub question: String,
    /// Topic the question belongs to, e.g. `"World Capitals"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Difficulty label, e.g. `"easy"`; `"medium"` is assumed in the prompt
    /// when a topic is given without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

impl From<AskRequest> for AskQuestion {
    fn from(req: AskRequest) -> Self {
        AskQuestion {
            question: req.question,
            topic: req.topic,
            difficulty: req.difficulty,
        }
    }
}

/// Response body for `POST /v1/geography/ask`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AskResponse {
    pub answer: String,
}

/// One stored question/answer exchange.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExchangeResponse {
    pub id: String,
    pub question: String,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

impl From<ChatExchange> for ExchangeResponse {
    fn from(ex: ChatExchange) -> Self {
        ExchangeResponse {
            id: ex.id,
            question: ex.message,
            answer: ex.response,
            topic: ex.topic,
            difficulty: ex.difficulty,
            created_at: ex.created_at.to_rfc3339(),
        }
    }
}

/// A catalog topic with its sample questions.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopicResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub sample_questions: Vec<String>,
}

impl From<TopicRecord> for TopicResponse {
    fn from(t: TopicRecord) -> Self {
        TopicResponse {
            id: t.id,
            name: t.name,
            description: t.description,
            difficulty: t.difficulty,
            sample_questions: t.sample_questions,
        }
    }
}

/// Response body for `POST /v1/geography/topics/seed`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SeedResponse {
    /// `false` when the catalog already had topics and nothing was inserted.
    pub seeded: bool,
    pub message: String,
}

impl From<SeedOutcome> for SeedResponse {
    fn from(outcome: SeedOutcome) -> Self {
        SeedResponse {
            seeded: outcome == SeedOutcome::Seeded,
            message: outcome.message().to_owned(),
        }
    }
}
