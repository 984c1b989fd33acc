//! Client configuration loaded from environment variables.

use std::path::PathBuf;

use subhub_shared::constants::DEFAULT_HTTP_PORT;
use subhub_shared::link::parse_backends;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the subhub server.
    /// Env: `SUBHUB_SERVER`
    /// Default: `http://127.0.0.1:8080`
    pub server_url: String,

    /// Converter backends offered to the link builder, in order.
    /// Env: `NEXT_PUBLIC_BACKENDS` (pipe-delimited)
    /// Default: `http://127.0.0.1:25500/sub?`
    pub backends: Vec<String>,

    /// SQLite file for saved subscriptions.
    /// Env: `SUBHUB_DB_PATH`
    /// Default: platform data directory (see `Database::default_path`).
    pub db_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: format!("http://127.0.0.1:{DEFAULT_HTTP_PORT}"),
            backends: parse_backends(None),
            db_path: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("SUBHUB_SERVER") {
            let url = url.trim().trim_end_matches('/');
            if !url.is_empty() {
                config.server_url = url.to_string();
            }
        }

        if let Some(raw) = lookup("NEXT_PUBLIC_BACKENDS") {
            config.backends = parse_backends(Some(&raw));
        }

        if let Some(path) = lookup("SUBHUB_DB_PATH").filter(|p| !p.trim().is_empty()) {
            config.db_path = Some(PathBuf::from(path));
        }

        config
    }
}
