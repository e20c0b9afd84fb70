//! Backend-owned ciphertext store
//!
//! Each entry pairs a ciphertext with its public-decryption grant. The grant
//! is fixed when the entry is inserted and has no setter.

use parking_lot::RwLock;

use crate::handle::Handle;
use crate::{FheError, FheResult};

struct Entry<C> {
    ciphertext: C,
    publicly_decryptable: bool,
}

/// Append-only store indexed by [`Handle`]
pub(crate) struct CiphertextStore<C> {
    entries: RwLock<Vec<Entry<C>>>,
}

impl<C: Clone> CiphertextStore<C> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Insert a ciphertext and issue a fresh handle for it
    pub(crate) fn insert(&self, ciphertext: C, publicly_decryptable: bool) -> Handle {
        let mut entries = self.entries.write();
        entries.push(Entry {
            ciphertext,
            publicly_decryptable,
        });
        Handle::new((entries.len() - 1) as u64)
    }

    pub(crate) fn get(&self, handle: Handle) -> FheResult<C> {
        self.with_entry(handle, |entry| entry.ciphertext.clone())
    }

    pub(crate) fn is_publicly_decryptable(&self, handle: Handle) -> FheResult<bool> {
        self.with_entry(handle, |entry| entry.publicly_decryptable)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }

    fn with_entry<T>(&self, handle: Handle, f: impl FnOnce(&Entry<C>) -> T) -> FheResult<T> {
        let entries = self.entries.read();
        usize::try_from(handle.raw())
            .ok()
            .and_then(|index| entries.get(index))
            .map(f)
            .ok_or_else(|| FheError::UnknownHandle(handle.to_string()))
    }
}
