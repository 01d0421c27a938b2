//! EventHub Server: enrollment admission service
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use eventhub_api::{AppState, build_router};
use eventhub_core::config::{AppConfig, StoreBackend};
use eventhub_core::error::AppError;
use eventhub_database::DatabasePool;
use eventhub_service::{
    CatalogSeed, EnrollmentStore, MemoryEnrollmentStore, PgEnrollmentStore, SessionCatalog,
};

#[tokio::main]
async fn main() {
    let env = std::env::var("EVENTHUB_ENV").unwrap_or_else(|_| "development".to_string());

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
        tracing::error!(error = %e, "Server error");
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

/// Ledger backend wired from configuration.
struct Backend {
    catalog: Arc<dyn SessionCatalog>,
    store: Arc<dyn EnrollmentStore>,
    /// Present for the Postgres backend, closed on shutdown.
    db: Option<DatabasePool>,
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting EventHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Ledger backend ───────────────────────────────────
    let backend = build_backend(&config).await?;

    // ── Step 2: Build router ─────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    tracing::info!(
        time_conflict_scope = %config.admission.time_conflict_scope,
        max_attempts = config.admission.max_attempts,
        lock_timeout_ms = config.admission.lock_timeout_ms,
        "Admission policy"
    );
    let state = AppState::new(config, backend.catalog, backend.store);
    let app = build_router(state);

    // ── Step 3: Serve until shutdown ─────────────────────────────
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!("EventHub server listening on {}", addr);

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = shutdown_rx.changed().await;
    });
    let mut server = tokio::spawn(async move { server.await });

    let finished_early = tokio::select! {
        result = &mut server => Some(result),
        _ = shutdown_signal() => None,
    };

    let result = match finished_early {
        Some(result) => result,
        None => {
            tracing::info!(grace_seconds = grace.as_secs(), "Shutdown signal received");
            let _ = shutdown_tx.send(true);
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!("Grace period elapsed, dropping open connections");
                    server.abort();
                    Ok(Ok(()))
                }
            }
        }
    };

    if let Some(db) = backend.db {
        db.close().await;
    }

    match result {
        Ok(Ok(())) => {
            tracing::info!("EventHub server stopped");
            Ok(())
        }
        Ok(Err(e)) => Err(AppError::internal(format!("Server error: {e}"))),
        Err(e) => Err(AppError::internal(format!("Server task failed: {e}"))),
    }
}

/// Connect the configured ledger backend.
async fn build_backend(config: &AppConfig) -> Result<Backend, AppError> {
    match config.store.backend {
        StoreBackend::Postgres => {
            let db = DatabasePool::connect(&config.database).await?;
            if config.database.run_migrations {
                eventhub_database::migration::run_migrations(db.pool()).await?;
            }
            let store = Arc::new(PgEnrollmentStore::new(db.clone()));
            Ok(Backend {
                catalog: store.clone(),
                store,
                db: Some(db),
            })
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory ledger; enrollments are lost on restart");
            let store = Arc::new(MemoryEnrollmentStore::new());
            if let Some(path) = &config.store.seed_path {
                store.seed(load_seed(path).await?).await;
            }
            Ok(Backend {
                catalog: store.clone(),
                store,
                db: None,
            })
        }
    }
}

/// Read a catalog seed file for the memory backend.
async fn load_seed(path: &str) -> Result<CatalogSeed, AppError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::configuration(format!("Failed to read seed '{path}': {e}")))?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::configuration(format!("Invalid seed '{path}': {e}")))
}

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
