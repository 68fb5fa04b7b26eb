use super::{CountryStore, CountryTransaction, StagedWrites, lookup_key};
use crate::core::country::{NormalizedCountry, PersistedCountry};
use crate::core::error::StoreError;
use chrono::{DateTime, Utc};
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const COUNTRIES_PARTITION: &str = "countries";
const META_PARTITION: &str = "meta";
const NEXT_ID_KEY: &[u8] = b"next_id";

/// Country store backed by a fjall keyspace. Rows are JSON-encoded under
/// their `name_key`.
pub struct FjallCountryStore {
    keyspace: Keyspace,
    countries: PartitionHandle,
    meta: PartitionHandle,
}

impl FjallCountryStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let keyspace = Config::new(path).open()?;
        let countries =
            keyspace.open_partition(COUNTRIES_PARTITION, PartitionCreateOptions::default())?;
        let meta = keyspace.open_partition(META_PARTITION, PartitionCreateOptions::default())?;
        debug!(path = %path.display(), "Opened country store");

        Ok(Self {
            keyspace,
            countries,
            meta,
        })
    }

    fn next_id(&self) -> Result<u64, StoreError> {
        match self.meta.get(NEXT_ID_KEY)? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(1),
        }
    }

    fn row(&self, key: &str) -> Result<Option<PersistedCountry>, StoreError> {
        match self.countries.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

pub struct FjallTransaction<'a> {
    store: &'a FjallCountryStore,
    staged: StagedWrites,
}

impl CountryTransaction for FjallTransaction<'_> {
    fn upsert(
        &mut self,
        country: &NormalizedCountry,
        refreshed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let store = self.store;
        self.staged
            .stage(country, refreshed_at, |key| store.row(key))
    }

    fn snapshot(&self) -> Result<Vec<PersistedCountry>, StoreError> {
        Ok(self.staged.overlay(self.store.all()?))
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let store = self.store;
        let next_id = self.staged.next_id().max(store.next_id()?);

        let mut batch = store.keyspace.batch();
        let mut written = 0usize;
        for (key, row) in self.staged.into_rows() {
            batch.insert(&store.countries, key.as_bytes(), serde_json::to_vec(&row)?);
            written += 1;
        }
        batch.insert(&store.meta, NEXT_ID_KEY, serde_json::to_vec(&next_id)?);
        batch.commit()?;
        store.keyspace.persist(PersistMode::SyncAll)?;

        debug!(rows = written, "Country store COMMIT");
        Ok(())
    }

    fn rollback(self: Box<Self>) {
        debug!("Country store ROLLBACK");
    }
}

impl CountryStore for FjallCountryStore {
    fn begin(&self) -> Result<Box<dyn CountryTransaction + Send + '_>, StoreError> {
        Ok(Box::new(FjallTransaction {
            store: self,
            staged: StagedWrites::new(self.next_id()?),
        }))
    }

    fn all(&self) -> Result<Vec<PersistedCountry>, StoreError> {
        let mut rows = Vec::new();
        for item in self.countries.iter() {
            let (_key, value) = item?;
            rows.push(serde_json::from_slice::<PersistedCountry>(&value)?);
        }
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    fn get(&self, name: &str) -> Result<Option<PersistedCountry>, StoreError> {
        self.row(&lookup_key(name))
    }

    fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let key = lookup_key(name);
        if !self.countries.contains_key(key.as_bytes())? {
            return Ok(false);
        }
        self.countries.remove(key.as_bytes())?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!(key = %key, "Country store REMOVE");
        Ok(true)
    }
}
