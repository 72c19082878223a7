//! The question-answering service.
//!
//! [`Tutor::ask`] is the one operation with side effects outside the
//! database: it builds a prompt, makes a single completion call and, only if
//! that call produced text, records the exchange for the caller. There is no
//! retry and no deduplication; asking twice stores two exchanges.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use crate::entities::{ChatExchange, ChatStore, SqliteStore, TopicRecord, TopicStore};
use crate::error::TutorError;
use crate::llm::{CompletionClient, CompletionRequest, PromptMessage};
use crate::seed::GEOGRAPHY_TOPICS;
use crate::types::UserId;

pub const SYSTEM_PROMPT: &str = "You are a knowledgeable geography teacher and expert. Your role is to:

1. Answer geography questions accurately and comprehensively
2. Provide educational explanations that help students learn
3. Include interesting facts and context when relevant
4. Use clear, engaging language appropriate for students
5. If asked about locations, include details about climate, culture, economy, or physical features
6. For map-related questions, describe locations relative to other known places
7. Always be encouraging and supportive of learning

Keep responses informative but concise (2-4 paragraphs max). Focus on being educational and helpful.";

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_OUTPUT_TOKENS: u32 = 500;
/// Size of the history window returned to a caller.
pub const HISTORY_LIMIT: u32 = 20;
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Difficulty assumed in the prompt when a topic is given without one.
const DEFAULT_PROMPT_DIFFICULTY: &str = "medium";

/// A question as submitted by the caller.
#[derive(Debug, Clone, Default, Validate)]
pub struct AskQuestion {
    #[validate(length(max = 4000, message = "question must be at most 4000 characters"))]
    pub question: String,
    #[validate(length(max = 200, message = "topic must be at most 200 characters"))]
    pub topic: Option<String>,
    #[validate(length(max = 32, message = "difficulty must be at most 32 characters"))]
    pub difficulty: Option<String>,
}

impl AskQuestion {
    pub fn new(question: impl Into<String>) -> Self {
        Self { question: question.into(), ..Self::default() }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Some(difficulty.into());
        self
    }

    /// Trim the question and drop blank labels. Fails on an empty question.
    /// Length limits apply to the normalized values.
    fn normalize(self) -> Result<Self, TutorError> {
        let normalized = Self {
            question: self.question.trim().to_owned(),
            topic: non_blank(self.topic),
            difficulty: non_blank(self.difficulty),
        };
        if normalized.question.is_empty() {
            return Err(TutorError::InvalidInput("question must not be empty".into()));
        }
        normalized
            .validate()
            .map_err(|e| TutorError::InvalidInput(e.to_string()))?;
        Ok(normalized)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Build the user message sent after the system prompt.
pub fn build_user_prompt(question: &str, topic: Option<&str>, difficulty: Option<&str>) -> String {
    match (topic, difficulty) {
        (Some(topic), difficulty) => format!(
            "Topic: {topic}\nDifficulty: {}\nQuestion: {question}",
            difficulty.unwrap_or(DEFAULT_PROMPT_DIFFICULTY)
        ),
        (None, Some(difficulty)) => format!("Difficulty: {difficulty}\nQuestion: {question}"),
        (None, None) => question.to_owned(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded,
    AlreadyInitialized,
}

impl SeedOutcome {
    pub fn message(self) -> &'static str {
        match self {
            SeedOutcome::Seeded => "Topics initialized successfully",
            SeedOutcome::AlreadyInitialized => "Topics already initialized",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TutorSettings {
    /// Model identifier passed to the completion endpoint.
    pub model: String,
}

impl Default for TutorSettings {
    fn default() -> Self {
        Self { model: DEFAULT_MODEL.to_owned() }
    }
}

pub struct Tutor {
    store: SqliteStore,
    client: Arc<dyn CompletionClient>,
    settings: TutorSettings,
}

impl std::fmt::Debug for Tutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tutor")
            .field("store", &self.store)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Tutor {
    pub fn new(
        store: SqliteStore,
        client: Arc<dyn CompletionClient>,
        settings: TutorSettings,
    ) -> Self {
        Self { store, client, settings }
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// Answer a question for `caller` and record the exchange.
    pub async fn ask(
        &self,
        caller: Option<&UserId>,
        input: AskQuestion,
    ) -> Result<String, TutorError> {
        let caller = caller.ok_or(TutorError::Unauthorized)?;
        let input = input.normalize()?;

        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![
                PromptMessage::system(SYSTEM_PROMPT),
                PromptMessage::user(build_user_prompt(
                    &input.question,
                    input.topic.as_deref(),
                    input.difficulty.as_deref(),
                )),
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_OUTPUT_TOKENS,
        };

        let answer = self.client.complete(request).await.map_err(|e| {
            error!(user = %caller, error = %e, "completion request failed");
            TutorError::Upstream(e)
        })?;

        self.store
            .append_exchange(ChatExchange {
                id: Uuid::new_v4().to_string(),
                user_id: caller.as_str().to_owned(),
                message: input.question,
                response: answer.clone(),
                topic: input.topic,
                difficulty: input.difficulty,
                created_at: Utc::now(),
            })
            .await?;

        info!(user = %caller, answer_len = answer.len(), "question answered");
        Ok(answer)
    }

    /// The caller's most recent exchanges, newest first. Anonymous callers
    /// get an empty list rather than an error.
    pub async fn history(&self, caller: Option<&UserId>) -> Result<Vec<ChatExchange>, TutorError> {
        let Some(caller) = caller else {
            return Ok(Vec::new());
        };
        Ok(self
            .store
            .list_recent_exchanges(caller.as_str(), HISTORY_LIMIT)
            .await?)
    }

    pub async fn topics(&self) -> Result<Vec<TopicRecord>, TutorError> {
        Ok(self.store.list_topics().await?)
    }

    /// Load the fixed catalog unless any topic already exists.
    ///
    /// The existence check and the insert are not atomic: two first-time
    /// seeds racing each other can both insert.
    pub async fn seed_topics(&self) -> Result<SeedOutcome, TutorError> {
        if self.store.has_topics().await? {
            info!("topic catalog already present; skipping seed");
            return Ok(SeedOutcome::AlreadyInitialized);
        }
        self.store.insert_topics(GEOGRAPHY_TOPICS).await?;
        info!(count = GEOGRAPHY_TOPICS.len(), "topic catalog seeded");
        Ok(SeedOutcome::Seeded)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tracing_test::traced_test;

    use crate::entities::memory_store;
    use crate::llm::{CompletionError, Role};
    use crate::types::Difficulty;

    /// Replies with a fixed answer (or fails) and remembers every request.
    struct ScriptedClient {
        reply: Option<String>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedClient {
        fn answering(reply: &str) -> Arc<Self> {
            Arc::new(Self { reply: Some(reply.into()), seen: Mutex::new(Vec::new()) })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { reply: None, seen: Mutex::new(Vec::new()) })
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
            self.seen.lock().unwrap().push(request);
            self.reply.clone().ok_or(CompletionError::Api {
                status: 500,
                message: "upstream exploded".into(),
            })
        }
    }

    async fn tutor_with(client: Arc<ScriptedClient>) -> Tutor {
        Tutor::new(memory_store().await, client, TutorSettings::default())
    }

    fn alice() -> UserId {
        UserId::parse("alice").unwrap()
    }

    #[test]
    fn user_prompt_prefixes_topic_and_defaults_difficulty() {
        assert_eq!(build_user_prompt("Q?", None, None), "Q?");
        assert_eq!(
            build_user_prompt("Q?", Some("World Capitals"), None),
            "Topic: World Capitals\nDifficulty: medium\nQuestion: Q?"
        );
        assert_eq!(
            build_user_prompt("Q?", Some("Oceans & Seas"), Some("hard")),
            "Topic: Oceans & Seas\nDifficulty: hard\nQuestion: Q?"
        );
        assert_eq!(build_user_prompt("Q?", None, Some("easy")), "Difficulty: easy\nQuestion: Q?");
    }

    #[tokio::test]
    async fn ask_stores_one_exchange_and_returns_answer() {
        let client = ScriptedClient::answering("Paris is the capital of France.");
        let tutor = tutor_with(client.clone()).await;
        let caller = alice();

        let answer = tutor
            .ask(Some(&caller), AskQuestion::new("  What is the capital of France?  "))
            .await
            .unwrap();
        assert_eq!(answer, "Paris is the capital of France.");

        let history = tutor.history(Some(&caller)).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].message, "What is the capital of France?");
        assert_eq!(history[0].response, answer);
        assert_eq!(history[0].topic, None);
        assert_eq!(history[0].difficulty, None);

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.model, DEFAULT_MODEL);
        assert_eq!(req.max_tokens, 500);
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(req.messages[0].role, Role::System);
        assert_eq!(req.messages[0].content, SYSTEM_PROMPT);
        assert_eq!(req.messages[1].content, "What is the capital of France?");
    }

    #[tokio::test]
    async fn ask_records_topic_and_difficulty_as_supplied() {
        let client = ScriptedClient::answering("The Nile.");
        let tutor = tutor_with(client.clone()).await;
        let caller = alice();

        tutor
            .ask(
                Some(&caller),
                AskQuestion::new("What is the longest river in the world?")
                    .with_topic("Physical Geography")
                    .with_difficulty("hard"),
            )
            .await
            .unwrap();

        let stored = &tutor.history(Some(&caller)).await.unwrap()[0];
        assert_eq!(stored.topic.as_deref(), Some("Physical Geography"));
        assert_eq!(stored.difficulty.as_deref(), Some("hard"));
        assert_eq!(
            client.requests()[0].messages[1].content,
            "Topic: Physical Geography\nDifficulty: hard\nQuestion: What is the longest river in the world?"
        );
    }

    #[tokio::test]
    async fn anonymous_ask_is_rejected_before_any_call() {
        let client = ScriptedClient::answering("unused");
        let tutor = tutor_with(client.clone()).await;

        let err = tutor.ask(None, AskQuestion::new("Where is Peru?")).await.unwrap_err();
        assert!(matches!(err, TutorError::Unauthorized));
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn anonymous_history_is_empty() {
        let tutor = tutor_with(ScriptedClient::answering("Lima.")).await;
        let caller = alice();
        tutor.ask(Some(&caller), AskQuestion::new("Capital of Peru?")).await.unwrap();

        assert!(tutor.history(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_question_is_invalid() {
        let client = ScriptedClient::answering("unused");
        let tutor = tutor_with(client.clone()).await;

        let err = tutor.ask(Some(&alice()), AskQuestion::new("   ")).await.unwrap_err();
        assert!(matches!(err, TutorError::InvalidInput(_)));
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn overlong_question_is_invalid() {
        let tutor = tutor_with(ScriptedClient::answering("unused")).await;
        let err = tutor
            .ask(Some(&alice()), AskQuestion::new("x".repeat(4001)))
            .await
            .unwrap_err();
        assert!(matches!(err, TutorError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn length_limits_apply_after_trimming() {
        let tutor = tutor_with(ScriptedClient::answering("Noted.")).await;
        let caller = alice();
        let padded = format!("  {}  ", "x".repeat(4000));

        tutor
            .ask(Some(&caller), AskQuestion::new(padded).with_topic(" ".repeat(201)))
            .await
            .unwrap();

        let stored = &tutor.history(Some(&caller)).await.unwrap()[0];
        assert_eq!(stored.message.len(), 4000);
        assert_eq!(stored.topic, None);
    }

    #[tokio::test]
    async fn blank_labels_are_stored_as_absent() {
        let tutor = tutor_with(ScriptedClient::answering("Asia.")).await;
        let caller = alice();
        tutor
            .ask(
                Some(&caller),
                AskQuestion::new("Where is Nepal?").with_topic(" ").with_difficulty(""),
            )
            .await
            .unwrap();

        let stored = &tutor.history(Some(&caller)).await.unwrap()[0];
        assert_eq!(stored.topic, None);
        assert_eq!(stored.difficulty, None);
    }

    #[tokio::test]
    #[traced_test]
    async fn upstream_failure_is_generic_and_stores_nothing() {
        let tutor = tutor_with(ScriptedClient::failing()).await;
        let caller = alice();

        let err = tutor
            .ask(Some(&caller), AskQuestion::new("What is the deepest point in the ocean?"))
            .await
            .unwrap_err();
        assert!(matches!(err, TutorError::Upstream(_)));
        assert_eq!(err.to_string(), crate::error::UPSTREAM_FAILURE_MESSAGE);
        assert_eq!(tutor.store().count_exchanges("alice").await.unwrap(), 0);
        assert!(logs_contain("completion request failed"));
    }

    #[tokio::test]
    async fn duplicate_asks_store_duplicate_exchanges() {
        let client = ScriptedClient::answering("Canberra.");
        let tutor = tutor_with(client.clone()).await;
        let caller = alice();

        for _ in 0..2 {
            tutor
                .ask(Some(&caller), AskQuestion::new("What is the capital of Australia?"))
                .await
                .unwrap();
        }
        assert_eq!(tutor.store().count_exchanges("alice").await.unwrap(), 2);
        assert_eq!(client.requests().len(), 2);
    }

    #[tokio::test]
    async fn history_is_latest_first() {
        let tutor = tutor_with(ScriptedClient::answering("An answer.")).await;
        let caller = alice();
        tutor.ask(Some(&caller), AskQuestion::new("first")).await.unwrap();
        tutor.ask(Some(&caller), AskQuestion::new("second")).await.unwrap();

        let history = tutor.history(Some(&caller)).await.unwrap();
        assert_eq!(history[0].message, "second");
        assert_eq!(history[1].message, "first");
    }

    #[tokio::test]
    async fn history_is_capped_at_the_window() {
        let tutor = tutor_with(ScriptedClient::answering("An answer.")).await;
        let caller = alice();
        for i in 0..25 {
            tutor.ask(Some(&caller), AskQuestion::new(format!("q{i}"))).await.unwrap();
        }

        let history = tutor.history(Some(&caller)).await.unwrap();
        assert_eq!(history.len(), HISTORY_LIMIT as usize);
        assert_eq!(history[0].message, "q24");
        assert_eq!(history[19].message, "q5");
    }

    #[tokio::test]
    async fn seeding_twice_keeps_one_copy() {
        let tutor = tutor_with(ScriptedClient::answering("unused")).await;

        assert_eq!(tutor.seed_topics().await.unwrap(), SeedOutcome::Seeded);
        assert_eq!(tutor.seed_topics().await.unwrap(), SeedOutcome::AlreadyInitialized);

        let topics = tutor.topics().await.unwrap();
        assert_eq!(topics.len(), GEOGRAPHY_TOPICS.len());
        assert_eq!(topics[0].name, "World Capitals");
        assert_eq!(topics[3].difficulty, Difficulty::Hard);
        assert!(topics.iter().all(|t| t.sample_questions.len() == 3));
    }

    #[tokio::test]
    async fn seeding_is_a_no_op_when_any_topic_exists() {
        let tutor = tutor_with(ScriptedClient::answering("unused")).await;
        tutor.store().insert_topics(&GEOGRAPHY_TOPICS[..1]).await.unwrap();

        let outcome = tutor.seed_topics().await.unwrap();
        assert_eq!(outcome, SeedOutcome::AlreadyInitialized);
        assert_eq!(outcome.message(), "Topics already initialized");
        assert_eq!(tutor.store().count_topics().await.unwrap(), 1);
    }
}
