//! geo-tutor-server – entry point.
//!
//! Startup order:
//! 1. Parse configuration from environment variables (CLI flags override).
//! 2. Initialise structured tracing (JSON or pretty, optional rolling file).
//! 3. Open the SQLite database and run pending migrations.
//! 4. Build the completion client and the tutor service.
//! 5. Seed the topic catalog if it is empty.
//! 6. Build the Axum router and start the HTTP server with graceful shutdown.

mod config;
mod error;
mod middleware;
mod routes;
mod schemas;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use geo_tutor_core::entities::SqliteStore;
use geo_tutor_core::llm::{OpenAiClient, OpenAiConfig};
use geo_tutor_core::{Tutor, TutorSettings};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::Config;
use crate::middleware::auth::IdentityResolver;
use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "geo-tutor-server", version, about = "Geography tutoring chat backend")]
struct Cli {
    /// Address to bind, overrides GEO_BIND.
    #[arg(long)]
    bind: Option<String>,

    /// SQLite URL, overrides GEO_DATABASE_URL.
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Load the topic catalog into an empty database and exit.
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let cli = Cli::parse();
    let mut cfg = Config::from_env();
    if let Some(bind) = cli.bind {
        cfg.bind_address = bind;
    }
    if let Some(url) = cli.database_url {
        cfg.database_url = url;
    }

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = init_tracing(&cfg);
    info!(version = env!("CARGO_PKG_VERSION"), "geo-tutor-server starting");

    // ── 3. Database ────────────────────────────────────────────────────────────
    let store = SqliteStore::connect(&cfg.database_url).await?;
    info!(database_url = %cfg.database_url, "database ready");

    // ── 4. Tutor ───────────────────────────────────────────────────────────────
    let client = OpenAiClient::new(OpenAiConfig {
        base_url: cfg.openai_base_url.clone(),
        api_key: cfg.openai_api_key.clone(),
        timeout: cfg.llm_timeout,
    })?;
    if cfg.openai_api_key.is_none() {
        warn!("GEO_OPENAI_API_KEY is not set; completion requests are sent unauthenticated");
    }
    let tutor = Tutor::new(
        store,
        Arc::new(client),
        TutorSettings { model: cfg.model.clone() },
    );
    info!(model = %cfg.model, base_url = %cfg.openai_base_url, "tutor ready");

    // ── 5. Topic catalog ───────────────────────────────────────────────────────
    match cli.command.unwrap_or(Command::Serve) {
        Command::Seed => {
            let outcome = tutor.seed_topics().await?;
            info!(outcome = ?outcome, "{}", outcome.message());
            return Ok(());
        }
        Command::Serve => {
            if cfg.seed_on_startup {
                let outcome = tutor.seed_topics().await?;
                info!(outcome = ?outcome, "startup seed: {}", outcome.message());
            }
        }
    }

    // ── 6. Shared application state ────────────────────────────────────────────
    let identity = IdentityResolver::from_config(&cfg);
    if identity.token_count() == 0 && cfg.identity_header.is_none() {
        warn!("no GEO_AUTH_TOKENS or GEO_IDENTITY_HEADER configured; every caller is anonymous");
    }
    info!(
        tokens = identity.token_count(),
        identity_header = ?cfg.identity_header,
        "caller identity configured"
    );

    let state = Arc::new(AppState {
        config: Arc::new(cfg.clone()),
        tutor: Arc::new(tutor),
        identity: Arc::new(identity),
    });

    // ── 7. HTTP server with graceful shutdown ──────────────────────────────────
    let app = routes::build(Arc::clone(&state));
    let addr: SocketAddr = cfg.bind_address.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("geo-tutor-server stopped");
    Ok(())
}

/// Install the global subscriber. Returns the file writer's guard, if any.
fn init_tracing(cfg: &Config) -> Option<WorkerGuard> {
    // Warn loudly if the configured value is not a valid filter expression.
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: GEO_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    cfg.log_level, e
                );
                EnvFilter::new("info")
            }
        },
    };

    let stdout_layer = if cfg.log_json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .boxed()
    } else {
        fmt::layer().with_target(true).with_thread_ids(true).boxed()
    };

    let (file_layer, guard) = match &cfg.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "geo-tutor-server.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer).boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    guard
}

/// Returns a future that resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cli_defaults_to_serve() {
        let cli = Cli::parse_from(["geo-tutor-server"]);
        assert!(cli.command.is_none());
        assert!(cli.bind.is_none());
    }

    #[test]
    fn cli_parses_seed_and_overrides() {
        let cli = Cli::parse_from([
            "geo-tutor-server",
            "--bind",
            "127.0.0.1:9000",
            "--database-url",
            "sqlite::memory:",
            "seed",
        ]);
        assert!(matches!(cli.command, Some(Command::Seed)));
        assert_eq!(cli.bind.as_deref(), Some("127.0.0.1:9000"));
        assert_eq!(cli.database_url.as_deref(), Some("sqlite::memory:"));
    }
}
