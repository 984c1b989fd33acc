use subhub_shared::SubscriptionId;
use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// Stored records could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend refused the availability probe.
    #[error("Local storage is unavailable; check storage settings or leave private mode")]
    Unavailable,

    /// Writing would push the backend past its byte quota.
    #[error("Storage quota exceeded ({needed} bytes, quota {quota}); delete some old subscriptions")]
    QuotaExceeded { needed: usize, quota: usize },

    /// No record with the requested ID.
    #[error("Subscription not found")]
    NotFound,

    #[error("Subscription with ID {0} already exists")]
    DuplicateId(SubscriptionId),

    /// A draft failed validation.
    #[error("{0}")]
    Validation(String),

    #[error("This subscription is password protected; a password is required")]
    PasswordRequired,

    #[error("Wrong password")]
    WrongPassword,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
