//! The key-value surface every storage backend exposes.

use crate::error::Result;

/// Written by the availability probe. Backends leave it out of quota checks.
pub(crate) const PROBE_KEY: &str = "__storage_probe__";

/// String key-value storage in the shape of browser local storage.
pub trait StorageBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    fn remove_item(&self, key: &str) -> Result<()>;

    /// Write and remove a probe key. Any failure means the backend cannot be
    /// used right now.
    fn is_available(&self) -> bool {
        self.set_item(PROBE_KEY, "probe").is_ok() && self.remove_item(PROBE_KEY).is_ok()
    }
}

impl<B: StorageBackend + ?Sized> StorageBackend for &B {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}
