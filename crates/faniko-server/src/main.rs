mod config;

use std::net::SocketAddr;

use axum::http::HeaderValue;
use tracing::info;

use faniko_api::routes;
use faniko_api::state::AppStateInner;
use faniko_api::storage::Storage;
use faniko_store::Store;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "faniko_server=debug,faniko_api=debug,faniko_store=debug,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    let storage = Storage::new(config.uploads_dir.clone()).await?;
    let state = AppStateInner::new(Store::new(), storage);

    let app = routes::app(
        state,
        config.cors_origin.parse::<HeaderValue>()?,
        config.max_upload_bytes,
    );

    let addr: SocketAddr = config.address().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Faniko backend running on http://{}", addr);
    info!("Accepting browser requests from {}", config.cors_origin);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
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
