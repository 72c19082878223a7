//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use geo_tutor_core::Tutor;

use crate::config::Config;
use crate::middleware::auth::IdentityResolver;

#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Question answering, history and topic catalog.
    pub tutor: Arc<Tutor>,
    /// Maps request headers to a caller identity.
    pub identity: Arc<IdentityResolver>,
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory [`AppState`] for handler and router tests.

    use super::*;
    use async_trait::async_trait;
    use geo_tutor_core::TutorSettings;
    use geo_tutor_core::entities::SqliteStore;
    use geo_tutor_core::llm::{CompletionClient, CompletionError, CompletionRequest};

    pub const ALICE_TOKEN: &str = "tok-alice";
    pub const BOB_TOKEN: &str = "tok-bob";

    /// Answers every question with `reply`, or fails when `reply` is `None`.
    pub struct CannedClient(pub Option<String>);

    #[async_trait]
    impl CompletionClient for CannedClient {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, CompletionError> {
            self.0.clone().ok_or(CompletionError::EmptyResponse)
        }
    }

    pub async fn app_state(reply: Option<&str>) -> Arc<AppState> {
        let mut config = Config::from_lookup(|_| None);
        config.auth_tokens = vec![
            (ALICE_TOKEN.into(), "alice".into()),
            (BOB_TOKEN.into(), "bob".into()),
        ];
        let store = SqliteStore::connect("sqlite::memory:")
            .await
            .expect("in-memory store");
        let tutor = Tutor::new(
            store,
            Arc::new(CannedClient(reply.map(str::to_owned))),
            TutorSettings::default(),
        );
        Arc::new(AppState {
            identity: Arc::new(IdentityResolver::from_config(&config)),
            config: Arc::new(config),
            tutor: Arc::new(tutor),
        })
    }
}
