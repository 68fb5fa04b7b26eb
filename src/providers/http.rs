use crate::core::error::{ExternalSourceError, SourceKind};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};

pub(crate) const USER_AGENT: &str = concat!("ccx/", env!("CARGO_PKG_VERSION"));

/// Fetches `url` with the provider's shared `client` and decodes a JSON
/// body, attributing every failure to `kind`. Non-2xx responses are
/// failures; nothing is retried.
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    kind: SourceKind,
    timeout: Option<Duration>,
) -> Result<T, ExternalSourceError> {
    let mut request = client.get(url).header(reqwest::header::USER_AGENT, USER_AGENT);
    if let Some(timeout) = timeout {
        request = request.timeout(timeout);
    }

    debug!("Requesting {} data from {}", kind, url);
    let response = request
        .send()
        .await
        .map_err(|e| ExternalSourceError::new(kind, format!("Request error: {e} URL: {url}")))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ExternalSourceError::new(kind, format!("Failed to read response body: {e}")))?;

    if !status.is_success() {
        return Err(ExternalSourceError::new(
            kind,
            format!("{kind} API failed: {status} {body}"),
        ));
    }

    serde_json::from_str(&body).map_err(|e| {
        error!(error = ?e, response = %body, "Failed to parse {} response", kind);
        ExternalSourceError::new(kind, format!("Invalid {kind} payload: {e}"))
    })
}
