//! Server configuration, loaded from environment variables at startup.

use std::time::Duration;

/// Runtime configuration for geo-tutor-server.
///
/// Every field has a default so the server starts without any environment
/// variables set; asking questions still needs a reachable completion
/// endpoint and an API key if that endpoint requires one.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// SQLite database URL (default: `"sqlite://geo-tutor.db"`).
    pub database_url: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Directory for a daily-rolling log file in addition to stdout.
    pub log_dir: Option<String>,

    /// OpenAI-compatible base URL, including the `/v1` segment.
    pub openai_base_url: String,

    pub openai_api_key: Option<String>,

    /// Model identifier sent with every completion request.
    pub model: String,

    /// Whole-request timeout for the completion call. Unset keeps the HTTP
    /// client default.
    pub llm_timeout: Option<Duration>,

    /// Static bearer-token table, `token=user` pairs.
    pub auth_tokens: Vec<(String, String)>,

    /// Header carrying the caller identity when an auth proxy sits in front.
    pub identity_header: Option<String>,

    /// Comma-separated list of allowed CORS origins. Unset means wildcard.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,

    /// Load the topic catalog on startup when it is empty.
    pub seed_on_startup: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_owned());

        Self {
            bind_address: or("GEO_BIND", "0.0.0.0:3000"),
            database_url: or("GEO_DATABASE_URL", "sqlite://geo-tutor.db"),
            log_level: or("GEO_LOG", "info"),
            log_json: var("GEO_LOG_JSON").map(|v| parse_bool(&v)).unwrap_or(false),
            log_dir: var("GEO_LOG_DIR"),
            openai_base_url: or("GEO_OPENAI_BASE_URL", "https://api.openai.com/v1"),
            openai_api_key: var("GEO_OPENAI_API_KEY"),
            model: or("GEO_MODEL", geo_tutor_core::tutor::DEFAULT_MODEL),
            llm_timeout: var("GEO_LLM_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            auth_tokens: var("GEO_AUTH_TOKENS")
                .map(|v| parse_token_table(&v))
                .unwrap_or_default(),
            identity_header: var("GEO_IDENTITY_HEADER"),
            cors_allowed_origins: var("GEO_CORS_ORIGINS"),
            enable_swagger: var("GEO_ENABLE_SWAGGER").map(|v| parse_bool(&v)).unwrap_or(true),
            seed_on_startup: var("GEO_SEED_ON_STARTUP").map(|v| parse_bool(&v)).unwrap_or(true),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn parse_bool(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}

/// Parse `token=user,token2=user2`. Malformed entries are skipped.
fn parse_token_table(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|entry| {
            let (token, user) = entry.split_once('=')?;
            let (token, user) = (token.trim(), user.trim());
            (!token.is_empty() && !user.is_empty()).then(|| (token.to_owned(), user.to_owned()))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_without_environment() {
        let cfg = config(&[]);
        assert_eq!(cfg.bind_address, "0.0.0.0:3000");
        assert_eq!(cfg.database_url, "sqlite://geo-tutor.db");
        assert_eq!(cfg.model, "gpt-4.1-nano");
        assert_eq!(cfg.openai_base_url, "https://api.openai.com/v1");
        assert!(cfg.openai_api_key.is_none());
        assert!(cfg.llm_timeout.is_none());
        assert!(cfg.auth_tokens.is_empty());
        assert!(cfg.enable_swagger);
        assert!(cfg.seed_on_startup);
        assert!(!cfg.log_json);
    }

    #[test]
    fn overrides_are_read() {
        let cfg = config(&[
            ("GEO_BIND", "127.0.0.1:8080"),
            ("GEO_LOG_JSON", "TRUE"),
            ("GEO_ENABLE_SWAGGER", "false"),
            ("GEO_SEED_ON_STARTUP", "0"),
            ("GEO_LLM_TIMEOUT_SECS", "30"),
            ("GEO_IDENTITY_HEADER", "x-forwarded-user"),
        ]);
        assert_eq!(cfg.bind_address, "127.0.0.1:8080");
        assert!(cfg.log_json);
        assert!(!cfg.enable_swagger);
        assert!(!cfg.seed_on_startup);
        assert_eq!(cfg.llm_timeout, Some(Duration::from_secs(30)));
        assert_eq!(cfg.identity_header.as_deref(), Some("x-forwarded-user"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let cfg = config(&[("GEO_MODEL", "  "), ("GEO_OPENAI_API_KEY", "")]);
        assert_eq!(cfg.model, "gpt-4.1-nano");
        assert!(cfg.openai_api_key.is_none());
    }

    #[test]
    fn token_table_skips_malformed_entries() {
        let table = parse_token_table("tok-a=alice, tok-b = bob ,broken,=nobody,tok-c=");
        assert_eq!(
            table,
            vec![("tok-a".to_owned(), "alice".to_owned()), ("tok-b".to_owned(), "bob".to_owned())]
        );
    }
}
