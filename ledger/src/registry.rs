//! Debt record registry
//!
//! A key -> record table plus an append-only insertion-order index, both
//! guarded by one `RwLock`. Each record sits behind its own `Mutex`, so
//! verification of one id never waits on another.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;
use umbra_fhe::{Handle, Principal};

use crate::record::DebtRecord;
use crate::{LedgerError, LedgerResult};

#[derive(Default)]
struct RegistryState {
    records: HashMap<String, Arc<Mutex<DebtRecord>>>,
    order: Vec<String>,
}

/// Owner of all debt records
#[derive(Default)]
pub struct DebtRecordRegistry {
    state: RwLock<RegistryState>,
}

impl DebtRecordRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new sealed record. The uniqueness check and the insertion
    /// happen under one write lock.
    pub fn create(
        &self,
        id: &str,
        handle: Handle,
        interest_rate_annual: u32,
        term_months: u32,
        owner: Principal,
        now: u64,
    ) -> LedgerResult<()> {
        self.create_then(id, handle, interest_rate_annual, term_months, owner, now, |_| {})
    }

    /// Like [`create`](Self::create), running `then` on the new record
    /// before the write lock is released. No reader can observe the record
    /// until `then` returns.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn create_then(
        &self,
        id: &str,
        handle: Handle,
        interest_rate_annual: u32,
        term_months: u32,
        owner: Principal,
        now: u64,
        then: impl FnOnce(&DebtRecord),
    ) -> LedgerResult<()> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        match state.records.entry(id.to_string()) {
            Entry::Occupied(_) => {
                debug!(id, "duplicate record rejected");
                Err(LedgerError::DuplicateRecord(id.to_string()))
            }
            Entry::Vacant(slot) => {
                let record = DebtRecord::new(
                    id.to_string(),
                    handle,
                    interest_rate_annual,
                    term_months,
                    owner,
                    now,
                );
                then(&record);
                slot.insert(Arc::new(Mutex::new(record)));
                state.order.push(id.to_string());
                Ok(())
            }
        }
    }

    /// Snapshot of a record
    pub fn get(&self, id: &str) -> LedgerResult<DebtRecord> {
        Ok(self.slot(id)?.lock().clone())
    }

    /// Ids in insertion order, as a fresh sequence
    pub fn list_ids(&self) -> Vec<String> {
        self.state.read().order.clone()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state.read().records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.state.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shared cell of a single record, for the verifier
    pub(crate) fn slot(&self, id: &str) -> LedgerResult<Arc<Mutex<DebtRecord>>> {
        self.state
            .read()
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::RecordNotFound(id.to_string()))
    }
}

impl std::fmt::Debug for DebtRecordRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebtRecordRegistry")
            .field("records", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Principal {
        Principal::from_name("alice")
    }

    #[test]
    fn test_create_and_get() {
        let registry = DebtRecordRegistry::new();
        registry.create("d1", Handle::new(3), 12, 24, owner(), 100).unwrap();

        let record = registry.get("d1").unwrap();
        assert_eq!(record.id(), "d1");
        assert_eq!(record.encrypted_amount(), Handle::new(3));
        assert_eq!(record.interest_rate_annual(), 12);
        assert_eq!(record.term_months(), 24);
        assert_eq!(record.owner(), owner());
        assert_eq!(record.created_at(), 100);
        assert!(!record.verified());
    }

    #[test]
    fn test_duplicate_rejected_and_original_kept() {
        let registry = DebtRecordRegistry::new();
        registry.create("d1", Handle::new(0), 12, 24, owner(), 1).unwrap();
        assert_eq!(
            registry.create("d1", Handle::new(1), 5, 6, owner(), 2),
            Err(LedgerError::DuplicateRecord("d1".into()))
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("d1").unwrap().encrypted_amount(), Handle::new(0));
        assert_eq!(registry.list_ids(), vec!["d1".to_string()]);
    }

    #[test]
    fn test_get_missing() {
        let registry = DebtRecordRegistry::new();
        assert_eq!(
            registry.get("nope").unwrap_err(),
            LedgerError::RecordNotFound("nope".into())
        );
    }

    #[test]
    fn test_list_ids_insertion_order() {
        let registry = DebtRecordRegistry::new();
        for (i, id) in ["c", "a", "b"].iter().enumerate() {
            registry.create(id, Handle::new(i as u64), 1, 1, owner(), 0).unwrap();
        }
        assert_eq!(registry.list_ids(), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_list_ids_is_a_snapshot() {
        let registry = DebtRecordRegistry::new();
        registry.create("a", Handle::new(0), 1, 1, owner(), 0).unwrap();
        let before = registry.list_ids();
        registry.create("b", Handle::new(1), 1, 1, owner(), 0).unwrap();
        assert_eq!(before, vec!["a"]);
        assert_eq!(registry.list_ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_get_returns_snapshot() {
        let registry = DebtRecordRegistry::new();
        registry.create("a", Handle::new(0), 1, 1, owner(), 0).unwrap();
        let before = registry.get("a").unwrap();
        registry.slot("a").unwrap().lock().disclose(7).unwrap();
        assert!(!before.verified());
        assert_eq!(registry.get("a").unwrap().decrypted_amount(), Some(7));
    }

    #[test]
    fn test_concurrent_create_same_id() {
        let registry = DebtRecordRegistry::new();
        let successes = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..16u64)
                .map(|i| {
                    let registry = &registry;
                    scope.spawn(move || {
                        registry.create("race", Handle::new(i), 1, 1, owner(), i).is_ok()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|ok| *ok)
                .count()
        });
        assert_eq!(successes, 1);
        assert_eq!(registry.list_ids(), vec!["race"]);
    }
}
