//! Country records in their raw, normalized and persisted forms.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

/// Formats a timestamp as ISO-8601 UTC with millisecond precision.
pub fn iso8601(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::iso8601(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }
}

/// Reads any JSON value, keeping it only when it is a number.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(serde_json::Value::deserialize(deserializer)?.as_f64())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrencyDescriptor {
    pub code: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
}

/// A country as delivered by the catalog feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryRecord {
    pub name: Option<String>,
    pub capital: Option<String>,
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub population: Option<f64>,
    pub currencies: Option<Vec<Option<CurrencyDescriptor>>>,
    pub flag: Option<String>,
}

/// Currency code to units-per-base rate. Only strictly positive, finite
/// rates are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExchangeRateTable {
    rates: HashMap<String, f64>,
}

impl ExchangeRateTable {
    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl FromIterator<(String, f64)> for ExchangeRateTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let rates = iter
            .into_iter()
            .filter(|(_, rate)| rate.is_finite() && *rate > 0.0)
            .map(|(code, rate)| (code.to_uppercase(), rate))
            .collect();
        Self { rates }
    }
}

/// A country after derivation, ready to be upserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCountry {
    pub name: Option<String>,
    pub name_key: Option<String>,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: u64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    /// `Some(0.0)` when the country has no currency, `None` when the rate is unknown.
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
}

impl NormalizedCountry {
    pub fn is_persistable(&self) -> bool {
        self.name.is_some() && self.name_key.is_some()
    }
}

/// Durable row, unique on `name_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedCountry {
    pub id: u64,
    pub name: String,
    pub name_key: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: u64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
    #[serde(with = "iso_millis")]
    pub last_refreshed_at: DateTime<Utc>,
}

impl PersistedCountry {
    /// Builds the row for `country`, or returns `None` when it lacks a name.
    pub fn from_normalized(
        id: u64,
        country: &NormalizedCountry,
        refreshed_at: DateTime<Utc>,
    ) -> Option<Self> {
        Some(Self {
            id,
            name: country.name.clone()?,
            name_key: country.name_key.clone()?,
            capital: country.capital.clone(),
            region: country.region.clone(),
            population: country.population,
            currency_code: country.currency_code.clone(),
            exchange_rate: country.exchange_rate,
            estimated_gdp: country.estimated_gdp,
            flag_url: country.flag_url.clone(),
            last_refreshed_at: refreshed_at,
        })
    }
}

pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GdpSort {
    Ascending,
    Descending,
}

impl FromStr for GdpSort {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gdp_asc" => Ok(GdpSort::Ascending),
            "gdp_desc" => Ok(GdpSort::Descending),
            _ => Err(anyhow::anyhow!("Invalid sort order: {}", s)),
        }
    }
}

/// Filters and ordering for listing persisted countries.
#[derive(Debug, Clone, Default)]
pub struct CountryQuery {
    pub region: Option<String>,
    pub currency: Option<String>,
    pub sort: Option<GdpSort>,
}

impl CountryQuery {
    pub fn matches(&self, row: &PersistedCountry) -> bool {
        let region_ok = self.region.as_ref().is_none_or(|wanted| {
            row.region
                .as_deref()
                .is_some_and(|r| r.to_lowercase() == wanted.to_lowercase())
        });
        let currency_ok = self.currency.as_ref().is_none_or(|wanted| {
            row.currency_code.as_deref() == Some(wanted.to_uppercase().as_str())
        });
        region_ok && currency_ok
    }

    /// Filters `rows` and orders them. Rows without an estimate sort lowest.
    pub fn apply(&self, rows: Vec<PersistedCountry>) -> Vec<PersistedCountry> {
        let mut rows: Vec<_> = rows.into_iter().filter(|r| self.matches(r)).collect();
        rows.sort_by_key(|r| r.id);
        match self.sort {
            Some(GdpSort::Ascending) => rows.sort_by(|a, b| compare_gdp(a, b)),
            Some(GdpSort::Descending) => rows.sort_by(|a, b| compare_gdp(b, a)),
            None => {}
        }
        rows
    }
}

fn compare_gdp(a: &PersistedCountry, b: &PersistedCountry) -> Ordering {
    match (a.estimated_gdp, b.estimated_gdp) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub total: usize,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}
