use anyhow::{Context, Result};
use relaydesk_app::{router, AppState, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!(".env not loaded: {} (using process environment)", e);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = Config::load().context("Invalid configuration")?;
    if config.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; /api/session and /api/chat will fail");
    }

    let state = AppState::from_config(&config);
    state
        .store
        .initialize()
        .await
        .context("Failed to initialize data directory")?;

    let app = router(state);
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!("relaydesk listening on {} (data in {:?})", address, config.data_dir);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("relaydesk stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
