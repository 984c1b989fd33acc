//! Validation of user-entered subscription forms.

use subhub_shared::crypto::hash_password;

use crate::error::{Result, StoreError};
use crate::models::{PasswordChange, SavedSubscription, SubscriptionUpdate};

/// What the user typed: title, content and the optional password.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionDraft {
    pub title: String,
    pub content: String,
    pub has_password: bool,
    /// Plain text. Blank on edit means "keep the current password".
    pub password: String,
}

impl SubscriptionDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.has_password = true;
        self.password = password.into();
        self
    }

    /// Build a brand-new record. Title and content are stored trimmed.
    pub fn into_new_subscription(self) -> Result<SavedSubscription> {
        self.validate_text()?;
        if self.has_password && self.password.trim().is_empty() {
            return Err(StoreError::Validation("A password is required".into()));
        }

        let sub = SavedSubscription::new(self.title.trim(), self.content.trim());
        Ok(if self.has_password {
            sub.with_password_hash(hash_password(&self.password))
        } else {
            sub
        })
    }

    /// Changes that turn `existing` into this draft.
    pub fn to_update(&self, existing: &SavedSubscription) -> Result<SubscriptionUpdate> {
        self.validate_text()?;

        let password = if !self.has_password {
            PasswordChange::Clear
        } else if !self.password.trim().is_empty() {
            PasswordChange::Set(hash_password(&self.password))
        } else if let Some(hash) = existing.password_hash.clone() {
            PasswordChange::Set(hash)
        } else {
            return Err(StoreError::Validation("A password is required".into()));
        };

        Ok(SubscriptionUpdate::new()
            .title(self.title.trim())
            .content(self.content.trim())
            .password(password))
    }

    fn validate_text(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(StoreError::Validation("A title is required".into()));
        }
        if self.content.trim().is_empty() {
            return Err(StoreError::Validation("Subscription content is required".into()));
        }
        Ok(())
    }
}
