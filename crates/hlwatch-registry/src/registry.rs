//! Mutex-guarded address registry.

use crate::error::{RegistryError, RegistryResult};
use crate::store::AddressFile;
use hlwatch_core::UserAddress;
use parking_lot::Mutex;
use std::path::PathBuf;
use tracing::info;

/// Ordered list of tracked addresses backed by an [`AddressFile`].
///
/// `list`, `add` and `remove_at` all take the same lock. A mutation builds
/// the new list, persists it, and only then replaces the in-memory copy, so
/// a failed write leaves both unchanged.
#[derive(Debug)]
pub struct AddressRegistry {
    inner: Mutex<Vec<UserAddress>>,
    store: AddressFile,
}

impl AddressRegistry {
    /// Open the registry, loading any addresses already on disk.
    pub fn open(path: impl Into<PathBuf>) -> RegistryResult<Self> {
        let store = AddressFile::new(path);
        let addresses = store.load()?;
        info!(
            path = %store.path().display(),
            count = addresses.len(),
            "Loaded tracked addresses"
        );
        Ok(Self {
            inner: Mutex::new(addresses),
            store,
        })
    }

    /// Snapshot of the tracked addresses, in insertion order.
    pub fn list(&self) -> Vec<UserAddress> {
        self.inner.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Validate and append an address.
    pub fn add(&self, raw: &str) -> RegistryResult<UserAddress> {
        let address = UserAddress::parse(raw)?;

        let mut guard = self.inner.lock();
        if guard.contains(&address) {
            return Err(RegistryError::Duplicate(address.to_string()));
        }
        let mut next = guard.clone();
        next.push(address.clone());
        self.store.save(&next)?;
        *guard = next;

        info!(address = %address, count = guard.len(), "Address added");
        Ok(address)
    }

    /// Remove the address at zero-based `index`.
    pub fn remove_at(&self, index: usize) -> RegistryResult<UserAddress> {
        let mut guard = self.inner.lock();
        if index >= guard.len() {
            return Err(RegistryError::IndexOutOfRange {
                index,
                len: guard.len(),
            });
        }
        let mut next = guard.clone();
        let removed = next.remove(index);
        self.store.save(&next)?;
        *guard = next;

        info!(address = %removed, count = guard.len(), "Address removed");
        Ok(removed)
    }
}
