//! REST surface over the refresh pipeline and the country store.
//!
//! - countries: refresh, list, lookup, delete and the summary image
//! - status: row count and last refresh time

pub mod countries;
pub mod error;
pub mod server;
pub mod status;

use crate::core::Refresher;
use crate::store::CountryStore;
use axum::Router;
use std::sync::Arc;

pub use error::ApiError;
pub use server::Server;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CountryStore>,
    pub refresher: Arc<Refresher>,
}

impl AppState {
    pub fn new(store: Arc<dyn CountryStore>, refresher: Arc<Refresher>) -> Self {
        Self { store, refresher }
    }
}

/// Build the main application router by merging all route modules
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(countries::routes())
        .merge(status::routes())
        .fallback(error::not_found)
        .with_state(state)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use axum::http::StatusCode;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_unknown_route_returns_404() {
        let dir = tempdir().unwrap();
        let router = build_router(sample_state(&dir));

        let response = send(&router, "GET", "/unknown/path").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json(response).await["error"], "Not Found");
    }
}
