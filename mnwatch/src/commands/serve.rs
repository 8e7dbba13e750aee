//! Dashboard server command.

use std::path::Path;
use std::sync::Arc;

use mnwatch_core::{
    Broadcaster, ConfigOverrides, MonitorConfig, NodeDescriptor, NodeStore, Poller,
    SshCredentials, SshExecutor,
};

use crate::error::CliError;
use crate::http::{AppState, build_router};
use crate::util::{load_config, load_nodes, runtime};

/// Serve command handler
pub fn cmd_serve(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<(), CliError> {
    let config = load_config(config_path, overrides)?;
    let credentials = config.validate()?;
    let nodes = load_nodes(&config)?;

    runtime()?.block_on(serve(config, credentials, nodes))
}

async fn serve(
    config: MonitorConfig,
    credentials: SshCredentials,
    nodes: Vec<NodeDescriptor>,
) -> Result<(), CliError> {
    let store = NodeStore::new();
    for node in &nodes {
        store.init(node);
    }
    let broadcaster = Broadcaster::new(
        config.http.max_subscribers,
        config.http.keepalive(),
        config.http.subscriber_buffer,
    );

    let executor = Arc::new(SshExecutor::new(credentials, config.poll));
    let poller = Poller::new(nodes, executor, store.clone(), broadcaster.clone(), config.poll);

    let listener = tokio::net::TcpListener::bind(&config.http.listen)
        .await
        .map_err(|e| CliError::Server(format!("Failed to bind {}: {e}", config.http.listen)))?;
    tracing::info!(listen = %config.http.listen, "Dashboard API listening");

    poller.start();

    let app = build_router(AppState {
        store,
        broadcaster: broadcaster.clone(),
    });
    let shutdown = {
        let poller = poller.clone();
        async move {
            shutdown_signal().await;
            poller.stop();
            broadcaster.shutdown();
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| CliError::Server(e.to_string()))?;

    tracing::info!("Server closed");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => tracing::info!("SIGTERM received, shutting down"),
                    _ = sigint.recv() => tracing::info!("SIGINT received, shutting down"),
                }
                return;
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Failed to install signal handlers, using Ctrl-C only");
            }
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Interrupt received, shutting down");
}
