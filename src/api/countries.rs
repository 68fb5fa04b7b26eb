//! Country endpoints: refresh, filtered listing, lookup, delete and the
//! summary image.

use super::{ApiError, AppState};
use crate::core::country::{CountryQuery, PersistedCountry, iso8601};
use axum::{
    Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub message: String,
    pub total: usize,
    pub last_refreshed_at: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub region: Option<String>,
    pub currency: Option<String>,
    pub sort: Option<String>,
}

impl ListParams {
    fn into_query(self) -> CountryQuery {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        CountryQuery {
            region: present(self.region),
            currency: present(self.currency),
            sort: self.sort.and_then(|s| s.parse().ok()),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/countries", get(list_countries))
        .route("/countries/refresh", post(refresh_countries))
        .route("/countries/image", get(summary_image))
        .route("/countries/{name}", get(get_country).delete(delete_country))
}

/// POST /countries/refresh
async fn refresh_countries(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let result = state.refresher.refresh(state.store.as_ref()).await?;
    Ok(Json(RefreshResponse {
        message: "Refreshed successfully".to_string(),
        total: result.total,
        last_refreshed_at: iso8601(&result.last_refreshed_at),
    }))
}

/// GET /countries?region=&currency=&sort=gdp_desc|gdp_asc
async fn list_countries(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<PersistedCountry>>, ApiError> {
    let query = params.into_query();
    debug!(?query, "Listing countries");
    Ok(Json(state.store.list(&query)?))
}

/// GET /countries/{name}
async fn get_country(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PersistedCountry>, ApiError> {
    state
        .store
        .get(&name)?
        .map(Json)
        .ok_or(ApiError::NotFound("Country not found"))
}

/// DELETE /countries/{name}
async fn delete_country(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.store.delete(&name)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Country not found"))
    }
}

/// GET /countries/image
async fn summary_image(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let path = state.refresher.artifact_path();
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, "image/svg+xml")], bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ApiError::NotFound("Summary image not found"))
        }
        Err(e) => Err(ApiError::Internal(format!(
            "Failed to read {}: {e}",
            path.display()
        ))),
    }
}
