use super::{CountryStore, CountryTransaction, StagedWrites, lookup_key};
use crate::core::country::{NormalizedCountry, PersistedCountry};
use crate::core::error::StoreError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

#[derive(Debug)]
struct Tables {
    countries: HashMap<String, PersistedCountry>,
    next_id: u64,
}

/// In-memory country store using a HashMap behind an RwLock
#[derive(Debug)]
pub struct MemoryCountryStore {
    inner: RwLock<Tables>,
}

impl MemoryCountryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Tables {
                countries: HashMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for MemoryCountryStore {
    fn default() -> Self {
        Self::new()
    }
}

pub struct MemoryTransaction<'a> {
    store: &'a MemoryCountryStore,
    staged: StagedWrites,
}

impl MemoryCountryStore {
    fn committed(&self) -> Result<Vec<PersistedCountry>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let mut rows: Vec<_> = tables.countries.values().cloned().collect();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }
}

impl CountryTransaction for MemoryTransaction<'_> {
    fn upsert(
        &mut self,
        country: &NormalizedCountry,
        refreshed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let store = self.store;
        self.staged.stage(country, refreshed_at, |key| {
            let tables = store.inner.read().map_err(|_| StoreError::Poisoned)?;
            Ok(tables.countries.get(key).cloned())
        })
    }

    fn snapshot(&self) -> Result<Vec<PersistedCountry>, StoreError> {
        Ok(self.staged.overlay(self.store.committed()?))
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut tables = self.store.inner.write().map_err(|_| StoreError::Poisoned)?;
        tables.next_id = tables.next_id.max(self.staged.next_id());
        for (key, row) in self.staged.into_rows() {
            tables.countries.insert(key, row);
        }
        debug!(rows = tables.countries.len(), "Memory store COMMIT");
        Ok(())
    }

    fn rollback(self: Box<Self>) {
        debug!("Memory store ROLLBACK");
    }
}

impl CountryStore for MemoryCountryStore {
    fn begin(&self) -> Result<Box<dyn CountryTransaction + Send + '_>, StoreError> {
        let next_id = self.inner.read().map_err(|_| StoreError::Poisoned)?.next_id;
        Ok(Box::new(MemoryTransaction {
            store: self,
            staged: StagedWrites::new(next_id),
        }))
    }

    fn all(&self) -> Result<Vec<PersistedCountry>, StoreError> {
        self.committed()
    }

    fn get(&self, name: &str) -> Result<Option<PersistedCountry>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables.countries.get(&lookup_key(name)).cloned())
    }

    fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let removed = tables.countries.remove(&lookup_key(name)).is_some();
        debug!(name, removed, "Memory store REMOVE");
        Ok(removed)
    }
}
