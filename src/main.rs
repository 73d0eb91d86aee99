//! SessionKV Server: session and authorization code storage.
//!
//! Wires the record store, session repository, authorization code store
//! and the expired session sweep together, then runs until shutdown.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use sessionkv_auth::{AuthorizationCodeStore, SessionRepository};
use sessionkv_core::config::AppConfig;
use sessionkv_core::error::AppError;
use sessionkv_store::RecordMapper;
use sessionkv_worker::CronScheduler;

#[tokio::main]
async fn main() {
    let env = std::env::var("SESSIONKV_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, fatal = e.is_fatal(), "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting SessionKV v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Record store ─────────────────────────────────────
    tracing::info!(provider = %config.store.provider, "Initializing record store...");
    let mapper = Arc::new(RecordMapper::new(&config.store).await?);
    if !mapper.health_check().await? {
        return Err(AppError::service_unavailable(
            "Record store failed its health check",
        ));
    }
    tracing::info!("Record store initialized");

    // ── Step 2: Repositories ─────────────────────────────────────
    let sessions = Arc::new(SessionRepository::from_config(
        Arc::clone(&mapper),
        &config.session,
    ));
    let codes = AuthorizationCodeStore::from_config(Arc::clone(&mapper), &config.authorization_code)?;
    tracing::info!(
        default_max_inactive_interval_seconds = sessions.default_max_inactive_interval_seconds(),
        "Session repository ready"
    );
    tracing::debug!(?codes, "Authorization code store ready");

    // ── Step 3: Expired session sweep ────────────────────────────
    let mut scheduler = if config.session.cleanup.enabled {
        let scheduler = CronScheduler::new().await?;
        scheduler
            .register_session_cleanup(Arc::clone(&sessions), &config.session.cleanup)
            .await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Session cleanup disabled");
        None
    };

    // ── Step 4: Wait for shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");

    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }

    tracing::info!("SessionKV shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
