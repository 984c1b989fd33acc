//! Password gate for protected records.
//!
//! A record unlocked once stays unlocked for the rest of the session; the
//! set of unlocked IDs is never written anywhere.

use std::collections::HashSet;

use subhub_shared::crypto::verify_password;
use subhub_shared::SubscriptionId;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::models::SavedSubscription;

#[derive(Debug, Default)]
pub struct SessionGate {
    verified: HashSet<SubscriptionId>,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow access to `sub`, checking `password` if the record is protected
    /// and not yet unlocked in this session.
    pub fn authorize(&mut self, sub: &SavedSubscription, password: Option<&str>) -> Result<()> {
        if !sub.has_password || self.verified.contains(&sub.id) {
            return Ok(());
        }

        let password = password
            .filter(|p| !p.trim().is_empty())
            .ok_or(StoreError::PasswordRequired)?;

        // A protected record without a hash can never be unlocked.
        let hash = sub.password_hash.as_deref().ok_or(StoreError::WrongPassword)?;
        if !verify_password(password, hash) {
            return Err(StoreError::WrongPassword);
        }

        debug!(id = %sub.id, "subscription unlocked for this session");
        self.verified.insert(sub.id);
        Ok(())
    }

    pub fn is_verified(&self, id: SubscriptionId) -> bool {
        self.verified.contains(&id)
    }

    pub fn forget(&mut self, id: SubscriptionId) {
        self.verified.remove(&id);
    }
}
