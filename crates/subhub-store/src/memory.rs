use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::backend::{StorageBackend, PROBE_KEY};
use crate::error::{Result, StoreError};

/// Process-local backend. Nothing survives the process.
///
/// A byte quota and a "disabled" switch reproduce the two ways browser
/// storage fails in practice: full, or blocked outright.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
    quota: Option<usize>,
    disabled: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total size of keys plus values, in bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.set(disabled);
    }

    /// Raw access for inspecting what a store wrote.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn ensure_enabled(&self) -> Result<()> {
        if self.disabled.get() {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.ensure_enabled()?;
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_enabled()?;

        if let Some(quota) = self.quota.filter(|_| key != PROBE_KEY) {
            let others: usize = self
                .items
                .borrow()
                .iter()
                .filter(|(k, _)| k.as_str() != key && k.as_str() != PROBE_KEY)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }

        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.ensure_enabled()?;
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}
