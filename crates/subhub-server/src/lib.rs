//! # subhub-server
//!
//! HTTP service that stores raw subscription text as flat files and hands
//! back links to fetch it again.
//!
//! - `POST /api/upload` writes `{content, oldId?}` to `<id>.txt` under a
//!   fresh random ID and returns `{Code, Url, Message}`
//! - `GET /api/sub/{id}` returns the stored text verbatim
//! - `GET /health` for liveness checks

pub mod api;
pub mod config;
pub mod error;
pub mod file_store;

pub use api::{build_router, serve, serve_on, AppState};
pub use config::ServerConfig;
pub use error::ServerError;
pub use file_store::FileStore;
