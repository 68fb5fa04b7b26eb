//! End-to-end refresh: fetch both feeds, derive, upsert the batch inside one
//! transaction, render the summary artifact and commit.

use super::country::{NormalizedCountry, iso8601};
use super::derive::normalize;
use super::error::RefreshError;
use super::source::{CountryCatalogProvider, ExchangeRateProvider, fetch_external_data};
use super::summary::render_summary;
use crate::store::{CountryStore, CountryTransaction};
use chrono::{DateTime, SubsecRound, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct RefreshResult {
    /// Rows in the store after the refresh, not the number of fetched records.
    pub total: usize,
    pub last_refreshed_at: DateTime<Utc>,
    pub artifact_path: PathBuf,
}

pub struct Refresher {
    catalog: Arc<dyn CountryCatalogProvider>,
    rates: Arc<dyn ExchangeRateProvider>,
    artifact_path: PathBuf,
    // Held for the whole refresh, so refreshes never overlap.
    rng: Mutex<StdRng>,
}

impl Refresher {
    pub fn new(
        catalog: Arc<dyn CountryCatalogProvider>,
        rates: Arc<dyn ExchangeRateProvider>,
        artifact_path: impl Into<PathBuf>,
    ) -> Self {
        Self::with_rng(catalog, rates, artifact_path, StdRng::from_entropy())
    }

    pub fn with_rng(
        catalog: Arc<dyn CountryCatalogProvider>,
        rates: Arc<dyn ExchangeRateProvider>,
        artifact_path: impl Into<PathBuf>,
        rng: StdRng,
    ) -> Self {
        Self {
            catalog,
            rates,
            artifact_path: artifact_path.into(),
            rng: Mutex::new(rng),
        }
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    /// Runs one refresh against `store`. The store only ever sees the whole
    /// batch or nothing.
    pub async fn refresh(&self, store: &dyn CountryStore) -> Result<RefreshResult, RefreshError> {
        let mut rng = self.rng.lock().await;

        info!("Fetching external country data");
        let (records, rates) =
            fetch_external_data(self.catalog.as_ref(), self.rates.as_ref()).await?;

        let batch: Vec<NormalizedCountry> = records
            .iter()
            .map(|record| normalize(record, &rates, &mut *rng))
            .collect();

        let mut tx = store.begin()?;
        // Millisecond precision is what every store keeps.
        let refreshed_at = Utc::now().trunc_subsecs(3);

        match self.write_batch(tx.as_mut(), &batch, refreshed_at).await {
            Ok(total) => {
                tx.commit()?;
                info!(
                    total,
                    last_refreshed_at = %iso8601(&refreshed_at),
                    "Refresh committed"
                );
                Ok(RefreshResult {
                    total,
                    last_refreshed_at: refreshed_at,
                    artifact_path: self.artifact_path.clone(),
                })
            }
            Err(e) => {
                warn!(error = %e, "Refresh failed, rolling back");
                tx.rollback();
                Err(e)
            }
        }
    }

    async fn write_batch(
        &self,
        tx: &mut (dyn CountryTransaction + Send + '_),
        batch: &[NormalizedCountry],
        refreshed_at: DateTime<Utc>,
    ) -> Result<usize, RefreshError> {
        let mut skipped = 0usize;
        for country in batch {
            if !country.is_persistable() {
                skipped += 1;
                debug!(?country, "Skipping country without a name");
                continue;
            }
            tx.upsert(country, refreshed_at)?;
        }
        debug!(upserted = batch.len() - skipped, skipped, "Staged refresh batch");

        let rows = tx.snapshot()?;
        render_summary(&rows, refreshed_at, &self.artifact_path).await?;
        Ok(rows.len())
    }
}
