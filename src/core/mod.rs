//! Core refresh pipeline: data model, derivation rules, feed aggregation,
//! orchestration and summary rendering.

pub mod config;
pub mod country;
pub mod derive;
pub mod error;
pub mod log;
pub mod refresh;
pub mod source;
pub mod summary;

// Re-export main types for cleaner imports
pub use country::{CountryQuery, GdpSort, NormalizedCountry, PersistedCountry};
pub use error::{ExternalSourceError, RefreshError, RenderError, SourceKind, StoreError};
pub use refresh::{RefreshResult, Refresher};
pub use source::{CountryCatalogProvider, ExchangeRateProvider};
