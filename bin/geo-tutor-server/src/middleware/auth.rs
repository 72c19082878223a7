//! Caller identity.
//!
//! Authentication itself happens elsewhere; this layer only maps what the
//! auth provider hands us onto a [`UserId`]. Two sources are supported:
//!
//! - a trusted header set by a fronting auth proxy (`GEO_IDENTITY_HEADER`),
//! - a static bearer-token table (`GEO_AUTH_TOKENS`).
//!
//! A request matching neither is anonymous. Handlers decide what anonymous
//! callers may do.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, header};
use axum::middleware::Next;
use axum::response::Response;
use geo_tutor_core::{TutorError, UserId};
use tracing::{Span, warn};

use crate::config::Config;
use crate::error::ServerError;
use crate::state::AppState;

#[derive(Debug, Default)]
pub struct IdentityResolver {
    tokens: HashMap<String, UserId>,
    header: Option<HeaderName>,
}

impl IdentityResolver {
    pub fn from_config(cfg: &Config) -> Self {
        let tokens = cfg
            .auth_tokens
            .iter()
            .filter_map(|(token, user)| Some((token.clone(), UserId::parse(user)?)))
            .collect();
        let header = cfg.identity_header.as_deref().and_then(|name| {
            HeaderName::from_bytes(name.trim().to_ascii_lowercase().as_bytes())
                .map_err(|e| warn!(header = %name, error = %e, "ignoring invalid identity header name"))
                .ok()
        });
        Self { tokens, header }
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn resolve(&self, headers: &HeaderMap) -> Option<UserId> {
        if let Some(name) = &self.header {
            let from_proxy = headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(UserId::parse);
            if from_proxy.is_some() {
                return from_proxy;
            }
        }

        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))?;
        self.tokens.get(token.trim()).cloned()
    }
}

/// Resolved identity of the current request, inserted by [`resolve_identity`].
#[derive(Debug, Clone, Default)]
pub struct CallerIdentity(pub Option<UserId>);

impl CallerIdentity {
    pub fn user(&self) -> Option<&UserId> {
        self.0.as_ref()
    }

    /// The caller, or a 401 for anonymous requests.
    pub fn require(&self) -> Result<&UserId, ServerError> {
        self.user().ok_or_else(|| TutorError::Unauthorized.into())
    }
}

pub async fn resolve_identity(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let caller = state.identity.resolve(req.headers());
    if let Some(user) = &caller {
        Span::current().record("user", tracing::field::display(user));
    }
    req.extensions_mut().insert(CallerIdentity(caller));
    next.run(req).await
}
