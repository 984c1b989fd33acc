//! # subhub-store
//!
//! Local storage for saved subscriptions.
//!
//! Records live as one JSON array under a single key of a small key-value
//! backend, mirroring how the web client keeps them in browser local
//! storage. Two backends are provided: a SQLite file ([`Database`]) for the
//! CLI and an in-memory map ([`MemoryStorage`]) for tests and throwaway
//! sessions. On top of that sit [`SubscriptionStore`] (CRUD), [`SessionGate`]
//! (password check for protected records) and [`SubscriptionDraft`]
//! (form validation).

pub mod backend;
pub mod database;
pub mod drafts;
pub mod gate;
mod kv;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod subscriptions;

mod error;

pub use backend::StorageBackend;
pub use database::Database;
pub use drafts::SubscriptionDraft;
pub use error::{Result, StoreError};
pub use gate::SessionGate;
pub use memory::MemoryStorage;
pub use models::*;
pub use subscriptions::SubscriptionStore;
