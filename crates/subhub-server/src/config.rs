//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

use subhub_shared::constants::{DEFAULT_HTTP_PORT, MAX_CONTENT_SIZE, SUBSCRIPTIONS_DIR};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Directory holding one `<id>.txt` file per subscription.
    /// Env: `SUBSCRIPTIONS_PATH`
    /// Default: `./subscriptions`
    pub storage_path: PathBuf,

    /// Public base URL used when building subscription links, e.g.
    /// `https://sub.example.com`. When unset, the base is derived from
    /// request headers.
    /// Env: `BASE_URL`
    pub base_url: Option<String>,

    /// Whether `X-Forwarded-Proto` / `X-Forwarded-Host` are honoured when
    /// deriving the base URL. Only safe behind a proxy that sets them.
    /// Env: `TRUST_PROXY_HEADERS` (true/false)
    /// Default: `true`
    pub trust_proxy_headers: bool,

    /// Maximum subscription size in bytes (10 MiB).
    /// Env: `MAX_CONTENT_SIZE`
    pub max_content_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            storage_path: PathBuf::from(SUBSCRIPTIONS_DIR),
            base_url: None,
            trust_proxy_headers: true,
            max_content_size: MAX_CONTENT_SIZE,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(path) = lookup("SUBSCRIPTIONS_PATH") {
            config.storage_path = PathBuf::from(path);
        }

        if let Some(url) = lookup("BASE_URL") {
            let url = url.trim().trim_end_matches('/');
            if !url.is_empty() {
                config.base_url = Some(url.to_string());
            }
        }

        if let Some(val) = lookup("TRUST_PROXY_HEADERS") {
            config.trust_proxy_headers = val != "false" && val != "0";
        }

        if let Some(val) = lookup("MAX_CONTENT_SIZE") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.max_content_size = n,
                _ => tracing::warn!(value = %val, "Invalid MAX_CONTENT_SIZE, using default"),
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}
