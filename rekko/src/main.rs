mod api;
mod config;
mod db;
mod error;
mod jobs;
mod models;
mod scheduler;
mod services;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rekko")]
#[command(about = "Self-hostable recommendation engine for e-commerce storefronts")]
struct Args {
    /// Serve the API without the periodic background rebuild jobs
    #[arg(long)]
    no_scheduler: bool,
}

use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::db::{Database, DatabaseBackend, LibSqlBackend};
use crate::scheduler::{PeriodicJob, Scheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rekko=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.server.api_keys.is_empty() {
        tracing::warn!(
            "REKKO_API_KEYS is not set — protected endpoints are locked. Set REKKO_API_KEYS to enable access."
        );
    }

    tracing::info!("Initializing database...");
    let raw_db = Database::new(&config.database).await?;
    let db_backend = LibSqlBackend::new(raw_db);
    // Wrap in Arc<dyn DatabaseBackend> immediately so we can clone it
    let db: Arc<dyn DatabaseBackend> = Arc::new(db_backend);

    let state = AppState::new(config.clone(), db);

    let cancel_token = CancellationToken::new();

    if config.scheduler.enabled && !args.no_scheduler {
        tracing::info!("Starting periodic scheduler...");
        let mut scheduler = Scheduler::new();

        let engine = state.similarity.clone();
        let token = cancel_token.child_token();
        scheduler.register(PeriodicJob::new(
            "similarity-rebuild",
            config.scheduler.similarity_interval_secs,
            move || {
                let engine = engine.clone();
                let token = token.clone();
                async move { engine.rebuild(&token).await.map(|_| ()) }
            },
        ));

        let engine = state.scores.clone();
        let token = cancel_token.child_token();
        scheduler.register(PeriodicJob::new(
            "score-rebuild",
            config.scheduler.scores_interval_secs,
            move || {
                let engine = engine.clone();
                let token = token.clone();
                async move { engine.rebuild_all(&token).await.map(|_| ()) }
            },
        ));

        scheduler.start(&cancel_token);
    } else {
        tracing::info!("Periodic scheduler disabled");
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Rekko starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling background tasks...");
    cancel_token.cancel();
}
