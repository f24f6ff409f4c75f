//! ContractFlow - Main application entry point
//!
//! Starts the HTTP API server and the contract expiry worker.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::{net::TcpListener, signal, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use contractflow::{AppHandle, Config, create_app, init_tracing};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    let config = Config::load().map_err(|e| {
        std::io::Error::other(format!(
            "Failed to load configuration. Check DATABASE_URL and CONTRACTFLOW__* env vars: {}",
            e
        ))
    })?;
    init_tracing(&config.logging)?;

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let enable_docs = config.server.enable_docs;
    let grace_period = Duration::from_secs(config.lifecycle.shutdown_timeout_seconds);
    tracing::info!(
        %addr,
        storage = %config.database.backend,
        "Starting ContractFlow server"
    );

    let AppHandle {
        router,
        shutdown_token,
        workers,
    } = create_app(config)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to create application: {}", e)))?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);
    if enable_docs {
        tracing::info!("API documentation available at http://{}/docs", addr);
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(wait_for_signal(shutdown_token))
        .await?;

    drain_workers(workers, grace_period).await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM and cancel background tasks
async fn wait_for_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => tracing::info!("Received SIGTERM, initiating graceful shutdown"),
    }

    shutdown_token.cancel();
}

/// Wait for background tasks to finish, up to `grace_period`
async fn drain_workers(workers: Vec<JoinHandle<()>>, grace_period: Duration) {
    let count = workers.len();
    let all = async {
        for worker in workers {
            if let Err(e) = worker.await {
                tracing::warn!(error = %e, "Background task ended abnormally");
            }
        }
    };

    match tokio::time::timeout(grace_period, all).await {
        Ok(()) => tracing::info!(count, "Background tasks stopped"),
        Err(_) => tracing::warn!(
            grace_seconds = grace_period.as_secs(),
            "Background tasks did not stop within the grace period"
        ),
    }
}
