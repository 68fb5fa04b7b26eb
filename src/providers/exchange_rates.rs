use super::http::get_json;
use crate::core::country::ExchangeRateTable;
use crate::core::error::{ExternalSourceError, SourceKind};
use crate::core::source::ExchangeRateProvider;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct RatesResponse {
    base_code: Option<String>,
    rates: Option<HashMap<String, Value>>,
}

/// Exchange-rate table served as `{"rates": {"CODE": rate, ...}}`, as
/// returned by open.er-api.com.
pub struct OpenExchangeRatesProvider {
    client: reqwest::Client,
    url: String,
    timeout: Option<Duration>,
}

impl OpenExchangeRatesProvider {
    pub fn new(url: &str, timeout: Option<Duration>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl ExchangeRateProvider for OpenExchangeRatesProvider {
    #[instrument(name = "RatesFetch", skip(self), fields(url = %self.url))]
    async fn fetch_rates(&self) -> Result<ExchangeRateTable, ExternalSourceError> {
        let response: RatesResponse =
            get_json(&self.client, &self.url, SourceKind::Rates, self.timeout).await?;
        let rates = response
            .rates
            .ok_or_else(|| ExternalSourceError::new(SourceKind::Rates, "Invalid exchange rates payload"))?;

        // Entries that are not numbers count as missing rates.
        let table: ExchangeRateTable = rates
            .into_iter()
            .filter_map(|(code, rate)| rate.as_f64().map(|r| (code, r)))
            .collect();
        debug!(
            base = response.base_code.as_deref().unwrap_or("unknown"),
            count = table.len(),
            "Received exchange rates"
        );
        Ok(table)
    }
}
