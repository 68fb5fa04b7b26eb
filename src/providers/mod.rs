pub mod exchange_rates;
pub mod http;
pub mod rest_countries;

pub use exchange_rates::OpenExchangeRatesProvider;
pub use rest_countries::RestCountriesProvider;
