//! CRUD over the saved-subscription array.
//!
//! Every mutation reads the whole array, changes it and writes it back.
//! There is no locking: the last writer wins.

use subhub_shared::constants::STORAGE_KEY;
use subhub_shared::SubscriptionId;
use tracing::{debug, warn};

use crate::backend::StorageBackend;
use crate::error::{Result, StoreError};
use crate::models::{SavedSubscription, SubscriptionUpdate};

pub struct SubscriptionStore<B> {
    backend: B,
}

impl<B: StorageBackend> SubscriptionStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// All saved records, in insertion order.
    ///
    /// Never fails: unavailable storage, a missing key or unreadable data
    /// all read as an empty list.
    pub fn load_all(&self) -> Vec<SavedSubscription> {
        if !self.backend.is_available() {
            warn!("local storage is not available");
            return Vec::new();
        }

        let raw = match self.backend.get_item(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read saved subscriptions");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<SavedSubscription>>(&raw) {
            Ok(subs) => subs,
            Err(e) => {
                warn!(error = %e, "saved subscriptions are unreadable, ignoring them");
                Vec::new()
            }
        }
    }

    pub fn get(&self, id: SubscriptionId) -> Option<SavedSubscription> {
        self.load_all().into_iter().find(|s| s.id == id)
    }

    pub fn save(&self, sub: SavedSubscription) -> Result<()> {
        self.ensure_available()?;

        let mut subs = self.load_for_write()?;
        if subs.iter().any(|s| s.id == sub.id) {
            return Err(StoreError::DuplicateId(sub.id));
        }

        let id = sub.id;
        subs.push(sub);
        self.persist(&subs)?;

        debug!(id = %id, total = subs.len(), "saved subscription");
        Ok(())
    }

    /// Merge `changes` into the record and return the result.
    pub fn update(
        &self,
        id: SubscriptionId,
        changes: SubscriptionUpdate,
    ) -> Result<SavedSubscription> {
        self.ensure_available()?;

        let mut subs = self.load_for_write()?;
        let sub = subs
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound)?;
        changes.apply(sub);
        let updated = sub.clone();

        self.persist(&subs)?;

        debug!(id = %id, "updated subscription");
        Ok(updated)
    }

    pub fn delete(&self, id: SubscriptionId) -> Result<()> {
        self.ensure_available()?;

        let subs = self.load_for_write()?;
        let before = subs.len();
        let remaining: Vec<_> = subs.into_iter().filter(|s| s.id != id).collect();
        if remaining.len() == before {
            return Err(StoreError::NotFound);
        }

        self.persist(&remaining)?;

        debug!(id = %id, total = remaining.len(), "deleted subscription");
        Ok(())
    }

    fn ensure_available(&self) -> Result<()> {
        if self.backend.is_available() {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }

    /// The stored array for a read-modify-write. Unlike [`Self::load_all`],
    /// read and decode failures are errors, so a write never replaces data
    /// it could not parse.
    fn load_for_write(&self) -> Result<Vec<SavedSubscription>> {
        match self.backend.get_item(STORAGE_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn persist(&self, subs: &[SavedSubscription]) -> Result<()> {
        let json = serde_json::to_string(subs)?;
        self.backend.set_item(STORAGE_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStorage;
    use crate::models::PasswordChange;
    use crate::Database;

    fn store() -> SubscriptionStore<MemoryStorage> {
        SubscriptionStore::new(MemoryStorage::new())
    }

    #[test]
    fn save_then_load() {
        let store = store();
        let a = SavedSubscription::new("a", "ss://1");
        let b = SavedSubscription::new("b", "ss://2");
        store.save(a.clone()).unwrap();
        store.save(b.clone()).unwrap();

        assert_eq!(store.load_all(), vec![a.clone(), b]);
        assert_eq!(store.get(a.id), Some(a));
        assert_eq!(store.get(SubscriptionId::new()), None);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let store = store();
        let sub = SavedSubscription::new("a", "x");
        store.save(sub.clone()).unwrap();

        let err = store.save(sub.clone()).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(id) if id == sub.id));
        assert_eq!(store.load_all().len(), 1);
    }

    #[test]
    fn update_merges_and_keeps_id() {
        let store = store();
        let sub = SavedSubscription::new("a", "x");
        store.save(sub.clone()).unwrap();

        let updated = store
            .update(
                sub.id,
                SubscriptionUpdate::new()
                    .content("y")
                    .password(PasswordChange::Set("hash".into())),
            )
            .unwrap();

        assert_eq!(updated.id, sub.id);
        assert_eq!(updated.title, "a");
        assert_eq!(updated.content, "y");
        assert!(updated.has_password);
        assert!(updated.updated_at >= sub.updated_at);
        assert_eq!(updated.created_at, sub.created_at);
        assert_eq!(store.get(sub.id), Some(updated));
    }

    #[test]
    fn update_missing_is_not_found() {
        let store = store();
        let err = store
            .update(SubscriptionId::new(), SubscriptionUpdate::new().title("t"))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn delete_missing_leaves_storage_untouched() {
        let store = store();
        store.save(SavedSubscription::new("a", "x")).unwrap();
        let before = store.backend().raw(STORAGE_KEY);

        let err = store.delete(SubscriptionId::new()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
        assert_eq!(store.backend().raw(STORAGE_KEY), before);
    }

    #[test]
    fn delete_removes_only_that_record() {
        let store = store();
        let a = SavedSubscription::new("a", "x");
        let b = SavedSubscription::new("b", "y");
        store.save(a.clone()).unwrap();
        store.save(b.clone()).unwrap();

        store.delete(a.id).unwrap();
        assert_eq!(store.load_all(), vec![b]);
    }

    #[test]
    fn unavailable_storage() {
        let store = store();
        store.save(SavedSubscription::new("a", "x")).unwrap();
        store.backend().set_disabled(true);

        assert!(store.load_all().is_empty());
        assert!(matches!(
            store.save(SavedSubscription::new("b", "y")),
            Err(StoreError::Unavailable)
        ));
        assert!(matches!(
            store.delete(SubscriptionId::new()),
            Err(StoreError::Unavailable)
        ));
    }

    #[test]
    fn corrupt_or_non_array_data_reads_as_empty() {
        let store = store();
        store.backend().set_item(STORAGE_KEY, "{not json").unwrap();
        assert!(store.load_all().is_empty());

        store.backend().set_item(STORAGE_KEY, r#"{"a":1}"#).unwrap();
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn undecodable_record_blocks_writes_instead_of_dropping_data() {
        let store = store();
        let keep = SavedSubscription::new("keep me", "ss://1");
        let mut array = serde_json::to_value(vec![keep.clone()]).unwrap();
        array
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!({"id": "legacy-1", "title": "old"}));
        let raw = array.to_string();
        store.backend().set_item(STORAGE_KEY, &raw).unwrap();

        let err = store.save(SavedSubscription::new("new", "ss://2")).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
        assert!(matches!(
            store.update(keep.id, SubscriptionUpdate::new().title("t")),
            Err(StoreError::Serialization(_))
        ));
        assert!(matches!(store.delete(keep.id), Err(StoreError::Serialization(_))));
        assert_eq!(store.backend().raw(STORAGE_KEY).as_deref(), Some(raw.as_str()));
    }

    #[test]
    fn nearly_full_storage_still_loads_and_deletes() {
        let full = store();
        let a = SavedSubscription::new("a", "ss://1");
        let b = SavedSubscription::new("b", "ss://2");
        full.save(a.clone()).unwrap();
        full.save(b.clone()).unwrap();
        let raw = full.backend().raw(STORAGE_KEY).unwrap();

        let store = SubscriptionStore::new(MemoryStorage::with_quota(
            STORAGE_KEY.len() + raw.len() + 10,
        ));
        store.backend().set_item(STORAGE_KEY, &raw).unwrap();

        assert_eq!(store.load_all(), vec![a.clone(), b.clone()]);
        store.delete(a.id).unwrap();
        assert_eq!(store.load_all(), vec![b]);
    }

    #[test]
    fn quota_exceeded_keeps_previous_state() {
        let store = SubscriptionStore::new(MemoryStorage::with_quota(400));
        store.save(SavedSubscription::new("a", "x")).unwrap();

        let err = store
            .save(SavedSubscription::new("b", "y".repeat(500)))
            .unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
        assert_eq!(store.load_all().len(), 1);
    }

    #[test]
    fn sqlite_backend_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subs.db");
        let sub = SavedSubscription::new("persisted", "trojan://x");

        {
            let store = SubscriptionStore::new(Database::open_at(&path).unwrap());
            store.save(sub.clone()).unwrap();
        }

        let store = SubscriptionStore::new(Database::open_at(&path).unwrap());
        assert_eq!(store.load_all(), vec![sub]);
    }
}
