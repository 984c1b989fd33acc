use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use subhub_server::{api, AppState, FileStore, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,subhub_server=debug")),
        )
        .init();

    info!("Starting subhub server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");
    if config.base_url.is_none() && config.trust_proxy_headers {
        info!("BASE_URL unset; links follow X-Forwarded-* / Host request headers");
    }

    // -----------------------------------------------------------------------
    // 3. Open the subscription directory (created if missing)
    // -----------------------------------------------------------------------
    let store = FileStore::new(config.storage_path.clone(), config.max_content_size).await?;
    let existing = store.list().await?.len();
    info!(files = existing, "Existing subscriptions on disk");

    let http_addr = config.http_addr;
    let app_state = AppState {
        store: Arc::new(store),
        config: Arc::new(config),
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server until it fails or Ctrl+C arrives
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
