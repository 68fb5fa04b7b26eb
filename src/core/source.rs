//! External data feed abstractions and the concurrent aggregator over them.

use super::country::{CountryRecord, ExchangeRateTable};
use super::error::ExternalSourceError;
use async_trait::async_trait;
use tracing::{debug, instrument};

#[async_trait]
pub trait CountryCatalogProvider: Send + Sync {
    async fn fetch_countries(&self) -> Result<Vec<CountryRecord>, ExternalSourceError>;
}

#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    async fn fetch_rates(&self) -> Result<ExchangeRateTable, ExternalSourceError>;
}

/// Fetches both feeds concurrently and fails as soon as either one does.
#[instrument(name = "FetchExternalData", skip_all)]
pub async fn fetch_external_data(
    catalog: &dyn CountryCatalogProvider,
    rates: &dyn ExchangeRateProvider,
) -> Result<(Vec<CountryRecord>, ExchangeRateTable), ExternalSourceError> {
    let (countries, rates) =
        futures::future::try_join(catalog.fetch_countries(), rates.fetch_rates()).await?;
    debug!(
        countries = countries.len(),
        rates = rates.len(),
        "Fetched external data"
    );
    Ok((countries, rates))
}
