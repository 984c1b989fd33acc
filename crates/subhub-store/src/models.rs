//! Saved-subscription records and partial updates to them.
//!
//! The serialized layout matches what the web client keeps in local
//! storage: camelCase keys, optional fields omitted, timestamps as epoch
//! milliseconds.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use subhub_shared::link::extract_file_id;
use subhub_shared::{FileId, SubscriptionId};

/// A user-titled subscription kept in the local store.
///
/// `password_hash` is `Some` exactly when `has_password` is set; the
/// constructors and [`SubscriptionUpdate`] keep the two in step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SavedSubscription {
    /// Never changes after creation.
    pub id: SubscriptionId,
    pub title: String,
    pub content: String,
    /// Link returned by the upload API for `content`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_sub_link: Option<String>,
    pub has_password: bool,
    /// SHA-256 hex of the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl SavedSubscription {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: SubscriptionId::new(),
            title: title.into(),
            content: content.into(),
            sub_link: None,
            short_sub_link: None,
            has_password: false,
            password_hash: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_password_hash(mut self, hash: String) -> Self {
        self.has_password = true;
        self.password_hash = Some(hash);
        self
    }

    /// Server file currently backing this record, if it has been published.
    pub fn file_id(&self) -> Option<FileId> {
        self.sub_link.as_deref().and_then(extract_file_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordChange {
    /// Protect with this (already hashed) password.
    Set(String),
    Clear,
}

/// Fields to merge into an existing record. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    /// `Some(None)` removes the link.
    pub sub_link: Option<Option<String>>,
    pub short_sub_link: Option<Option<String>>,
    pub password: Option<PasswordChange>,
}

impl SubscriptionUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn sub_link(mut self, link: Option<String>) -> Self {
        self.sub_link = Some(link);
        self
    }

    pub fn short_sub_link(mut self, link: Option<String>) -> Self {
        self.short_sub_link = Some(link);
        self
    }

    pub fn password(mut self, change: PasswordChange) -> Self {
        self.password = Some(change);
        self
    }

    /// Merge into `sub`. The id and creation time are never touched;
    /// `updated_at` is always stamped.
    pub fn apply(self, sub: &mut SavedSubscription) {
        if let Some(title) = self.title {
            sub.title = title;
        }
        if let Some(content) = self.content {
            sub.content = content;
        }
        if let Some(link) = self.sub_link {
            sub.sub_link = link;
        }
        if let Some(link) = self.short_sub_link {
            sub.short_sub_link = link;
        }
        match self.password {
            Some(PasswordChange::Set(hash)) => {
                sub.has_password = true;
                sub.password_hash = Some(hash);
            }
            Some(PasswordChange::Clear) => {
                sub.has_password = false;
                sub.password_hash = None;
            }
            None => {}
        }
        sub.updated_at = now_millis();
    }
}

// Stored timestamps only carry milliseconds; keep in-memory values equal to
// what a reload returns.
fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_in_local_storage_layout() {
        let mut sub = SavedSubscription::new("Home", "ss://node");
        sub.created_at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        sub.updated_at = sub.created_at;

        let json = serde_json::to_value(&sub).unwrap();
        assert_eq!(json["title"], "Home");
        assert_eq!(json["hasPassword"], false);
        assert_eq!(json["createdAt"], 1_700_000_000_123i64);
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("subLink").is_none());
    }

    #[test]
    fn reads_records_written_by_the_web_client() {
        let raw = r#"{
            "id": "0b6f3b8e-8d52-4d8e-9c1c-3f1e2a7b9c10",
            "title": "Work",
            "content": "vmess://abc",
            "subLink": "https://sub.example/api/sub/k2j4h5",
            "hasPassword": true,
            "passwordHash": "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8",
            "createdAt": 1700000000000,
            "updatedAt": 1700000005000
        }"#;
        let sub: SavedSubscription = serde_json::from_str(raw).unwrap();
        assert!(sub.has_password);
        assert_eq!(sub.file_id().unwrap().as_str(), "k2j4h5");
        assert_eq!(sub.short_sub_link, None);
        assert_eq!(sub.updated_at.timestamp_millis(), 1_700_000_005_000);
    }

    #[test]
    fn update_keeps_identity_and_stamps_time() {
        let mut sub = SavedSubscription::new("a", "b");
        sub.updated_at = DateTime::from_timestamp_millis(0).unwrap();
        let (id, created) = (sub.id, sub.created_at);

        SubscriptionUpdate::new()
            .title("renamed")
            .sub_link(Some("http://h/api/sub/x1".into()))
            .apply(&mut sub);

        assert_eq!(sub.id, id);
        assert_eq!(sub.created_at, created);
        assert_eq!(sub.title, "renamed");
        assert_eq!(sub.content, "b");
        assert!(sub.updated_at > DateTime::from_timestamp_millis(0).unwrap());
    }

    #[test]
    fn password_change_keeps_hash_and_flag_in_step() {
        let mut sub = SavedSubscription::new("a", "b");
        SubscriptionUpdate::new()
            .password(PasswordChange::Set("h".into()))
            .apply(&mut sub);
        assert!(sub.has_password);
        assert_eq!(sub.password_hash.as_deref(), Some("h"));

        SubscriptionUpdate::new()
            .password(PasswordChange::Clear)
            .apply(&mut sub);
        assert!(!sub.has_password);
        assert_eq!(sub.password_hash, None);
    }
}
