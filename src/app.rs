//! Application setup and wiring

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use contractflow_core::Config;
use contractflow_core::config::StorageBackend;
use contractflow_core::infrastructure::Repositories;
use contractflow_orchestrator::presentation::{AppState, create_router};

use crate::workers::spawn_expiry_worker;

/// Handle returned from create_app for graceful shutdown coordination
pub struct AppHandle {
    pub router: Router,
    pub shutdown_token: CancellationToken,
    /// Background tasks that stop once `shutdown_token` is cancelled
    pub workers: Vec<JoinHandle<()>>,
}

/// Connect the configured storage backend
async fn connect_repositories(config: &Config) -> Result<Repositories, Box<dyn std::error::Error>> {
    match config.database.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Repositories::in_memory())
        }
        StorageBackend::Postgres => {
            let db = &config.database;
            let mut options = PgPoolOptions::new()
                .max_connections(db.max_connections)
                .acquire_timeout(Duration::from_secs(db.connect_timeout_seconds))
                .test_before_acquire(db.enable_health_checks);
            if let Some(min_idle) = db.min_idle {
                options = options.min_connections(min_idle);
            }
            if let Some(lifetime) = db.max_lifetime_seconds {
                options = options.max_lifetime(Duration::from_secs(lifetime));
            }
            if let Some(idle) = db.idle_timeout_seconds {
                options = options.idle_timeout(Duration::from_secs(idle));
            }

            tracing::info!(max_connections = db.max_connections, "Connecting to PostgreSQL");
            let pool = options.connect(&db.url).await.map_err(|e| {
                tracing::error!(error = %e, "Failed to connect to database");
                e
            })?;

            if db.run_migrations {
                tracing::info!("Running database migrations");
                sqlx::migrate!().run(&pool).await?;
            }

            Ok(Repositories::postgres(Arc::new(pool)))
        }
    }
}

/// Build the router and start background workers
pub async fn create_app(config: Config) -> Result<AppHandle, Box<dyn std::error::Error>> {
    let shutdown_token = CancellationToken::new();

    let repositories = connect_repositories(&config).await?;
    tracing::info!(storage = repositories.backend_name(), "Storage initialized");

    let lifecycle = config.lifecycle.clone();
    let app_state = AppState::new(repositories, config);

    let mut workers = Vec::new();
    if lifecycle.expiry_worker_enabled && lifecycle.check_interval_minutes > 0 {
        workers.push(spawn_expiry_worker(
            app_state.repositories.clone(),
            app_state.services.clone(),
            &lifecycle,
            shutdown_token.clone(),
        ));
    } else {
        tracing::info!("Contract expiry worker disabled");
    }

    let router = create_router(app_state);

    Ok(AppHandle {
        router,
        shutdown_token,
        workers,
    })
}
