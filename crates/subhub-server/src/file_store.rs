use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use subhub_shared::constants::SUBSCRIPTION_FILE_EXT;
use subhub_shared::FileId;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::ServerError;

/// How many fresh IDs to try before giving up on a write.
const MAX_ID_ATTEMPTS: usize = 8;

/// Verify that a path stays within the expected base directory.
fn ensure_within(base: &Path, target: &Path) -> Result<PathBuf, ServerError> {
    let relative = target.strip_prefix(base).map_err(|_| ServerError::PathTraversal)?;

    let mut resolved = base.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(c) => resolved.push(c),
            _ => return Err(ServerError::PathTraversal),
        }
    }
    Ok(resolved)
}

/// Flat directory of `<id>.txt` files, one per uploaded subscription.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
    max_size: usize,
}

impl FileStore {
    pub async fn new(base_path: PathBuf, max_size: usize) -> Result<Self, ServerError> {
        fs::create_dir_all(&base_path).await.map_err(|e| {
            ServerError::Storage(format!(
                "Failed to create subscription directory '{}': {}",
                base_path.display(),
                e
            ))
        })?;

        info!(path = %base_path.display(), "Subscription store initialized");

        Ok(Self {
            base_path,
            max_size,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Write `content` under a fresh ID.
    ///
    /// Files are created with create-new semantics, so an ID that already
    /// exists on disk is never overwritten; another one is drawn instead.
    pub async fn store(&self, content: &str) -> Result<FileId, ServerError> {
        if content.trim().is_empty() {
            return Err(ServerError::EmptyContent);
        }
        if content.len() > self.max_size {
            return Err(ServerError::ContentTooLarge {
                size: content.len(),
                max: self.max_size,
            });
        }

        for _ in 0..MAX_ID_ATTEMPTS {
            let id = FileId::generate();
            let path = self.safe_path(&id)?;

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    warn!(id = %id, "Generated ID already in use, drawing another");
                    continue;
                }
                Err(e) => {
                    return Err(ServerError::Storage(format!(
                        "Failed to create {}: {}",
                        id, e
                    )))
                }
            };

            file.write_all(content.as_bytes())
                .await
                .map_err(|e| ServerError::Storage(format!("Failed to write {}: {}", id, e)))?;
            file.flush()
                .await
                .map_err(|e| ServerError::Storage(format!("Failed to write {}: {}", id, e)))?;

            debug!(id = %id, size = content.len(), "Stored subscription");
            return Ok(id);
        }

        Err(ServerError::Storage(format!(
            "No free ID after {MAX_ID_ATTEMPTS} attempts"
        )))
    }

    /// Store `content` under a new ID, then drop the file it replaces.
    ///
    /// Removing the old file is best effort: a missing file or malformed old
    /// ID is logged and otherwise ignored.
    pub async fn replace(&self, content: &str, old_id: Option<&str>) -> Result<FileId, ServerError> {
        let id = self.store(content).await?;

        if let Some(old) = old_id.filter(|old| *old != id.as_str()) {
            let removed = match FileId::parse(old) {
                Ok(old_id) => self.delete(&old_id).await,
                Err(e) => Err(ServerError::InvalidId(e)),
            };
            match removed {
                Ok(()) => info!(old_id = %old, new_id = %id, "Deleted replaced subscription file"),
                Err(e) => warn!(old_id = %old, error = %e, "Failed to delete replaced subscription file"),
            }
        }

        Ok(id)
    }

    pub async fn read(&self, id: &FileId) -> Result<String, ServerError> {
        let path = self.safe_path(id)?;

        let content = fs::read_to_string(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => ServerError::NotFound(id.clone()),
            _ => ServerError::Storage(format!("Failed to read {}: {}", id, e)),
        })?;

        debug!(id = %id, size = content.len(), "Read subscription");
        Ok(content)
    }

    pub async fn delete(&self, id: &FileId) -> Result<(), ServerError> {
        let path = self.safe_path(id)?;

        fs::remove_file(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => ServerError::NotFound(id.clone()),
            _ => ServerError::Storage(format!("Failed to delete {}: {}", id, e)),
        })?;

        debug!(id = %id, "Deleted subscription");
        Ok(())
    }

    /// IDs of every stored subscription. Stray files are skipped.
    pub async fn list(&self) -> Result<Vec<FileId>, ServerError> {
        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&self.base_path)
            .await
            .map_err(|e| ServerError::Storage(format!("Failed to list subscriptions: {}", e)))?;

        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            ServerError::Storage(format!("Failed to read directory entry: {}", e))
        })? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SUBSCRIPTION_FILE_EXT) {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| FileId::parse(stem).ok())
            {
                ids.push(id);
            }
        }

        Ok(ids)
    }

    fn safe_path(&self, id: &FileId) -> Result<PathBuf, ServerError> {
        let raw = self.base_path.join(id.file_name());
        ensure_within(&self.base_path, &raw)
    }
}
