use super::{ApiError, AppState};
use crate::core::country::iso8601;
use axum::{Router, extract::State, response::Json, routing::get};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub total_countries: usize,
    pub last_refreshed_at: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/status", get(status_handler))
}

/// GET /status
async fn status_handler(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    let stats = state.store.stats()?;
    Ok(Json(StatusResponse {
        total_countries: stats.total,
        last_refreshed_at: stats.last_refreshed_at.as_ref().map(iso8601),
    }))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use axum::http::StatusCode;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_status_before_and_after_refresh() {
        let dir = tempdir().unwrap();
        let state = sample_state(&dir);
        let router = super::super::build_router(state.clone());

        let response = send(&router, "GET", "/status").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["total_countries"], 0);
        assert!(body["last_refreshed_at"].is_null());

        let result = state.refresher.refresh(state.store.as_ref()).await.unwrap();

        let body = json(send(&router, "GET", "/status").await).await;
        assert_eq!(body["total_countries"], 3);
        assert_eq!(body["last_refreshed_at"], iso8601(&result.last_refreshed_at));
    }
}
