//! # Todo API Server
//!
//! Wires configuration, storage and the HTTP surface into a running service.
//!
//! ```text
//! Config::from_env ──▶ build_store ──▶ AppState ──▶ build_router ──▶ serve
//!                      (memory | dynamodb)                          (graceful drain, bounded)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod telemetry;

pub use config::Config;

use anyhow::Context;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use todo_api_core::{MemoryTodoStore, TodoStore};
use todo_api_dynamodb::DynamoDbTodoStore;
use todo_api_web::{AppState, build_router, metrics};

/// Construct the backend selected by configuration.
///
/// Called once at startup; the result is shared by every request.
pub async fn build_store(config: &config::StorageConfig) -> Arc<dyn TodoStore> {
    if config.use_memory_store {
        tracing::info!("Using in-memory store");
        Arc::new(MemoryTodoStore::new())
    } else {
        tracing::info!(table_name = %config.table_name, "Using DynamoDB store");
        Arc::new(DynamoDbTodoStore::connect(config.dynamodb()).await)
    }
}

/// Run the service until a termination signal, then drain.
///
/// # Errors
///
/// Returns error if the metrics recorder cannot be installed, the address
/// cannot be bound, the server fails, or draining exceeds the shutdown timeout.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let store = build_store(&config.storage).await;
    let backend = store.backend();
    let handle = metrics::install_recorder()?;
    let app = build_router(AppState::new(store, handle, config.service_info()));

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        address = %addr,
        port = config.server.port,
        environment = %config.environment,
        commit = %config.commit,
        backend,
        "Server listening"
    );

    serve(listener, app, shutdown_signal(), config.shutdown_timeout()).await
}

/// Serve `app` until `signal` resolves, then drain in-flight requests.
///
/// New connections stop being accepted as soon as `signal` resolves. If the
/// drain has not finished after `grace`, serving is abandoned with an error.
///
/// # Errors
///
/// Returns error if the server fails or the drain exceeds `grace`.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    signal: F,
    grace: Duration,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (draining_tx, mut draining_rx) = tokio::sync::watch::channel(false);

    let server = async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                signal.await;
                let _ = draining_tx.send(true);
            })
            .await
    };

    let deadline = async move {
        let closed = draining_rx.wait_for(|draining| *draining).await.is_err();
        if closed {
            // Server finished without a signal
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => {
            result.context("server error")?;
            tracing::info!("Server stopped");
            Ok(())
        }
        () = deadline => {
            tracing::error!(
                grace_secs = grace.as_secs_f64(),
                "Could not close connections in time, forcefully shutting down"
            );
            anyhow::bail!("graceful shutdown timed out after {grace:?}")
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM.
///
/// A signal whose handler cannot be installed is logged and never fires.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
