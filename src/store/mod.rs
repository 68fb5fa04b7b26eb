//! Transactional country store, keyed uniquely on `name_key`.

pub mod disk;
pub mod memory;

use crate::core::country::{
    CountryQuery, NormalizedCountry, PersistedCountry, StoreStats, name_key,
};
use crate::core::error::StoreError;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

pub use disk::FjallCountryStore;
pub use memory::MemoryCountryStore;

/// A unit of atomicity over the store. Writes are invisible to other
/// readers until [`CountryTransaction::commit`]; dropping or rolling back
/// discards them.
pub trait CountryTransaction {
    /// Inserts a new row or overwrites every field of the row sharing the
    /// same `name_key`, keeping its id.
    fn upsert(
        &mut self,
        country: &NormalizedCountry,
        refreshed_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// All rows as seen from inside the transaction, in id order.
    fn snapshot(&self) -> Result<Vec<PersistedCountry>, StoreError>;

    fn commit(self: Box<Self>) -> Result<(), StoreError>;

    fn rollback(self: Box<Self>);
}

pub trait CountryStore: Send + Sync {
    fn begin(&self) -> Result<Box<dyn CountryTransaction + Send + '_>, StoreError>;

    /// Every committed row, in id order.
    fn all(&self) -> Result<Vec<PersistedCountry>, StoreError>;

    /// Case-insensitive lookup by name.
    fn get(&self, name: &str) -> Result<Option<PersistedCountry>, StoreError>;

    /// Removes the row matching `name` case-insensitively. Returns whether
    /// a row was removed.
    fn delete(&self, name: &str) -> Result<bool, StoreError>;

    fn list(&self, query: &CountryQuery) -> Result<Vec<PersistedCountry>, StoreError> {
        Ok(query.apply(self.all()?))
    }

    fn stats(&self) -> Result<StoreStats, StoreError> {
        let rows = self.all()?;
        Ok(StoreStats {
            total: rows.len(),
            last_refreshed_at: rows.iter().map(|r| r.last_refreshed_at).max(),
        })
    }
}

/// Upserts staged by a transaction, with the id sequence they advance.
#[derive(Debug, Default)]
pub(crate) struct StagedWrites {
    rows: BTreeMap<String, PersistedCountry>,
    next_id: u64,
}

impl StagedWrites {
    pub(crate) fn new(next_id: u64) -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id,
        }
    }

    pub(crate) fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Stages `country`, reusing the id of an earlier staged row or of the
    /// committed row returned by `existing`.
    pub(crate) fn stage(
        &mut self,
        country: &NormalizedCountry,
        refreshed_at: DateTime<Utc>,
        existing: impl FnOnce(&str) -> Result<Option<PersistedCountry>, StoreError>,
    ) -> Result<(), StoreError> {
        let Some(key) = country.name_key.clone() else {
            return Err(StoreError::Other("cannot upsert a country without a name".to_string()));
        };
        let id = match self.rows.get(&key) {
            Some(staged) => staged.id,
            None => match existing(&key)? {
                Some(row) => row.id,
                None => {
                    let id = self.next_id;
                    self.next_id += 1;
                    id
                }
            },
        };
        let row = PersistedCountry::from_normalized(id, country, refreshed_at)
            .ok_or_else(|| StoreError::Other("cannot upsert a country without a name".to_string()))?;
        self.rows.insert(key, row);
        Ok(())
    }

    /// Overlays the staged rows on `committed` and orders the result by id.
    pub(crate) fn overlay(&self, committed: Vec<PersistedCountry>) -> Vec<PersistedCountry> {
        let mut merged: BTreeMap<String, PersistedCountry> = committed
            .into_iter()
            .map(|row| (row.name_key.clone(), row))
            .collect();
        for (key, row) in &self.rows {
            merged.insert(key.clone(), row.clone());
        }
        let mut rows: Vec<_> = merged.into_values().collect();
        rows.sort_by_key(|r| r.id);
        rows
    }

    pub(crate) fn into_rows(self) -> impl Iterator<Item = (String, PersistedCountry)> {
        self.rows.into_iter()
    }
}

pub(crate) fn lookup_key(name: &str) -> String {
    name_key(name.trim())
}
