mod config;

use std::sync::Arc;

use anyhow::{Context, anyhow};
use tokio::task::JoinHandle;
use tracing::info;

use postbox_api::AppStateInner;
use postbox_db::SqliteSink;
use postbox_gateway::ingest::{BindError, IngestServer};
use postbox_gateway::relay::RelayClient;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "postbox_server=debug,postbox_api=debug,postbox_gateway=debug,postbox_db=info,tower_http=debug"
                    .into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    // Ingest server: TCP -> SQLite
    let sink = Arc::new(SqliteSink::new(&config.db_path));
    let ingest = IngestServer::bind(config.ingest_addr, sink).await?;
    info!("Records are stored in {}", config.db_path.display());

    // HTTP front end: static files + form relay
    let state = AppStateInner::new(RelayClient::new(config.relay_target()), &config.static_dir);
    let app = postbox_api::router(state);

    let listener = tokio::net::TcpListener::bind(config.http_addr)
        .await
        .map_err(|source| BindError {
            addr: config.http_addr,
            source,
        })?;
    info!("HTTP server listening on {}", config.http_addr);
    info!("Serving static files from {}", config.static_dir.display());

    let http_task: JoinHandle<anyhow::Result<()>> = tokio::spawn(async move {
        axum::serve(listener, app).await.context("HTTP server error")
    });
    let ingest_task: JoinHandle<anyhow::Result<()>> = tokio::spawn(async move {
        ingest.run().await;
        Ok(())
    });

    // Neither server returns on its own; the first one that does ends the process.
    tokio::select! {
        res = async {
            tokio::try_join!(
                supervise("HTTP server", http_task),
                supervise("ingest server", ingest_task)
            )
        } => res.map(|_| ()),
        _ = shutdown_signal() => Ok(()),
    }
}

async fn supervise(name: &str, task: JoinHandle<anyhow::Result<()>>) -> anyhow::Result<()> {
    match task.await {
        Ok(Ok(())) => Err(anyhow!("{} stopped unexpectedly", name)),
        Ok(Err(e)) => Err(e.context(format!("{} failed", name))),
        Err(e) => Err(anyhow!("{} task aborted: {}", name, e)),
    }
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
