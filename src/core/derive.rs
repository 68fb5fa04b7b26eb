//! Per-record derivation rules: currency selection, GDP estimation and
//! normalization of raw catalog entries.

use super::country::{
    CountryRecord, CurrencyDescriptor, ExchangeRateTable, NormalizedCountry, name_key,
};
use rand::Rng;
use std::ops::RangeInclusive;

/// Bounds of the random multiplier applied to population when estimating GDP.
pub const GDP_MULTIPLIER_RANGE: RangeInclusive<u32> = 1000..=2000;

/// Uppercased code of the first listed currency. Later entries are ignored.
pub fn pick_currency_code(currencies: &[Option<CurrencyDescriptor>]) -> Option<String> {
    let first = currencies.first()?.as_ref()?;
    first
        .code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_uppercase)
}

/// Estimates GDP as `population * M / rate` with `M` drawn from
/// [`GDP_MULTIPLIER_RANGE`].
///
/// Returns `Some(0.0)` when the country has no currency and `None` when the
/// currency is known but its rate is not.
pub fn estimate_gdp<R: Rng + ?Sized>(
    population: u64,
    exchange_rate: Option<f64>,
    has_currency: bool,
    rng: &mut R,
) -> Option<f64> {
    if !has_currency {
        return Some(0.0);
    }
    let rate = exchange_rate?;
    let multiplier = rng.gen_range(GDP_MULTIPLIER_RANGE);
    Some(population as f64 * f64::from(multiplier) / rate)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn normalize_population(population: Option<f64>) -> u64 {
    match population {
        Some(p) if p.is_finite() && p > 0.0 => p as u64,
        _ => 0,
    }
}

pub fn normalize<R: Rng + ?Sized>(
    record: &CountryRecord,
    rates: &ExchangeRateTable,
    rng: &mut R,
) -> NormalizedCountry {
    let name = non_empty(&record.name);
    let population = normalize_population(record.population);
    let currency_code = pick_currency_code(record.currencies.as_deref().unwrap_or_default());
    let exchange_rate = currency_code.as_deref().and_then(|code| rates.get(code));
    let estimated_gdp = estimate_gdp(population, exchange_rate, currency_code.is_some(), rng);

    NormalizedCountry {
        name_key: name.as_deref().map(name_key),
        name,
        capital: non_empty(&record.capital),
        region: non_empty(&record.region),
        population,
        currency_code,
        exchange_rate,
        estimated_gdp,
        flag_url: non_empty(&record.flag),
    }
}
