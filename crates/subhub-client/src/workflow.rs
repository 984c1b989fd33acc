//! Text-mode workflows: saved subscriptions whose content is published to
//! the server.
//!
//! A [`Workspace`] pairs the local store with the API client and a session
//! password gate. Protected records must be unlocked (once per session)
//! before they can be opened, changed, published or deleted.

use subhub_shared::link::extract_file_id;
use subhub_shared::{FileId, SubscriptionId};
use subhub_store::{
    SavedSubscription, SessionGate, StorageBackend, StoreError, SubscriptionDraft,
    SubscriptionStore, SubscriptionUpdate,
};
use tracing::info;

use crate::api::SubhubClient;
use crate::error::Result;

pub struct Workspace<B> {
    store: SubscriptionStore<B>,
    client: SubhubClient,
    gate: SessionGate,
}

impl<B: StorageBackend> Workspace<B> {
    pub fn new(backend: B, client: SubhubClient) -> Self {
        Self {
            store: SubscriptionStore::new(backend),
            client,
            gate: SessionGate::new(),
        }
    }

    pub fn store(&self) -> &SubscriptionStore<B> {
        &self.store
    }

    pub fn list(&self) -> Vec<SavedSubscription> {
        self.store.load_all()
    }

    /// Validate and store a new record. Nothing is uploaded yet.
    pub fn save(&self, draft: SubscriptionDraft) -> Result<SavedSubscription> {
        let sub = draft.into_new_subscription()?;
        self.store.save(sub.clone())?;
        info!(id = %sub.id, title = %sub.title, protected = sub.has_password, "subscription saved");
        Ok(sub)
    }

    /// Load a record for editing, checking its password if it has one.
    pub fn open(&mut self, id: SubscriptionId, password: Option<&str>) -> Result<SavedSubscription> {
        let sub = self.get(id)?;
        self.gate.authorize(&sub, password)?;
        Ok(sub)
    }

    /// Upload text that is not tied to a saved record.
    ///
    /// `current_link` is the link previously generated for this text; its
    /// file is replaced.
    pub async fn publish_text(&self, content: &str, current_link: Option<&str>) -> Result<String> {
        let old_id = current_link.and_then(extract_file_id);
        self.client
            .upload_sub_content(content.trim(), old_id.as_ref())
            .await
    }

    /// Upload a record's content, replacing its previous file, and store the
    /// new link. The old short link pointed at the old file, so it is
    /// dropped.
    pub async fn publish(
        &mut self,
        id: SubscriptionId,
        password: Option<&str>,
    ) -> Result<SavedSubscription> {
        let sub = self.open(id, password)?;
        let link = self.upload_for(&sub, &sub.content).await?;

        let updated = self.store.update(
            id,
            SubscriptionUpdate::new()
                .sub_link(Some(link))
                .short_sub_link(None),
        )?;
        Ok(updated)
    }

    /// Apply an edited draft: re-upload the content and merge the changes.
    ///
    /// A blank password in a protected draft keeps the current password.
    pub async fn update(
        &mut self,
        id: SubscriptionId,
        draft: SubscriptionDraft,
        password: Option<&str>,
    ) -> Result<SavedSubscription> {
        let existing = self.open(id, password)?;
        let changes = draft.to_update(&existing)?;

        let content = changes.content.clone().unwrap_or_else(|| existing.content.clone());
        let link = self.upload_for(&existing, &content).await?;

        let updated = self.store.update(
            id,
            changes.sub_link(Some(link)).short_sub_link(None),
        )?;
        info!(id = %id, "subscription updated");
        Ok(updated)
    }

    /// Remember a short link generated elsewhere for this record.
    pub fn set_short_link(
        &mut self,
        id: SubscriptionId,
        short_link: String,
        password: Option<&str>,
    ) -> Result<SavedSubscription> {
        self.open(id, password)?;
        let updated = self
            .store
            .update(id, SubscriptionUpdate::new().short_sub_link(Some(short_link)))?;
        Ok(updated)
    }

    /// Remove a record from the local store. The uploaded file stays on the
    /// server.
    pub fn delete(&mut self, id: SubscriptionId, password: Option<&str>) -> Result<()> {
        self.open(id, password)?;
        self.store.delete(id)?;
        self.gate.forget(id);
        info!(id = %id, "subscription deleted");
        Ok(())
    }

    pub async fn fetch(&self, id: &FileId) -> Result<Option<String>> {
        self.client.fetch(id).await
    }

    fn get(&self, id: SubscriptionId) -> Result<SavedSubscription> {
        self.store
            .get(id)
            .ok_or_else(|| StoreError::NotFound.into())
    }

    async fn upload_for(&self, sub: &SavedSubscription, content: &str) -> Result<String> {
        self.client
            .upload_sub_content(content, sub.file_id().as_ref())
            .await
    }
}
