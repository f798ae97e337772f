//! Neurovox Server Entry Point

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use neurovox_server::{bootstrap, create_router, http_loader, init_tracing, AppState, Args, ServerConfig};

fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServerConfig::load(&args)?;
    init_tracing(&config.logging)?;

    tracing::info!("Starting Neurovox Server v{}", env!("CARGO_PKG_VERSION"));

    // Models load on this thread, before any runtime or socket exists, so an
    // exhausted fallback chain exits without ever binding the port.
    let loader = http_loader(&config);
    let state = match bootstrap(config, &loader) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Startup failed");
            return Err(e);
        }
    };

    // Held outside the runtime: the model's blocking HTTP client must not be
    // dropped from async context.
    let service = Arc::clone(&state.service);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build async runtime")?;
    let result = runtime.block_on(serve(state));
    drop(runtime);
    drop(service);

    result
}

async fn serve(state: AppState) -> Result<()> {
    let host = state.config.server.host.clone();
    let port = state.config.server.port;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {host}:{port}"))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
