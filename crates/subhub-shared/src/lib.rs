//! # subhub-shared
//!
//! Types shared by the subhub server, local store and client: subscription
//! file IDs, the upload wire format, password hashing and link helpers.

pub mod constants;
pub mod crypto;
pub mod error;
pub mod link;
pub mod protocol;
pub mod types;

pub use error::IdError;
pub use types::{FileId, SubscriptionId};
