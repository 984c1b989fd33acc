//! # subhub-client
//!
//! Client side of subhub: an HTTP client for the upload/fetch API, the
//! text-mode workflows that tie saved subscriptions to uploaded files, and
//! the `subhub` command-line tool built on both.

pub mod api;
pub mod config;
pub mod error;
pub mod workflow;

pub use api::SubhubClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use workflow::Workspace;
