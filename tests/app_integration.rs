use ccx::core::{RefreshError, SourceKind};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tracing::info;

// Adds automatic logging to test
mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const COUNTRIES_JSON: &str = r#"[
        {
            "name": "Nigeria",
            "capital": "Abuja",
            "region": "Africa",
            "population": 206139587,
            "flag": "https://flagcdn.com/ng.svg",
            "currencies": [{"code": "NGN", "name": "Nigerian naira", "symbol": "₦"}]
        },
        {
            "name": "Antarctica",
            "region": "Polar",
            "population": 1000,
            "flag": "https://flagcdn.com/aq.svg"
        },
        {
            "name": "Kosovo",
            "capital": "Pristina",
            "region": "Europe",
            "population": 1775378,
            "currencies": [{"code": "EUR"}]
        }
    ]"#;

    pub const RATES_JSON: &str = r#"{
        "result": "success",
        "base_code": "USD",
        "rates": {"USD": 1, "NGN": 1600.25, "GHS": 15.3}
    }"#;

    /// Serves both feeds from one mock server under `/countries` and `/rates`.
    pub async fn create_feed_server(
        countries: (u16, &str),
        rates: (u16, &str),
    ) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/countries"))
            .respond_with(ResponseTemplate::new(countries.0).set_body_string(countries.1))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rates"))
            .respond_with(ResponseTemplate::new(rates.0).set_body_string(rates.1))
            .mount(&mock_server)
            .await;

        mock_server
    }
}

fn write_config(dir: &TempDir, feed_uri: &str) -> std::path::PathBuf {
    let config_path = dir.path().join("config.yaml");
    let config_content = format!(
        r#"
        sources:
          countries:
            url: "{feed_uri}/countries"
          rates:
            url: "{feed_uri}/rates"
          timeout_secs: 5
        data_path: "{data}"
    "#,
        data = dir.path().join("data").display()
    );
    fs::write(&config_path, &config_content).expect("Failed to write config file");
    config_path
}

fn artifact_in(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("data").join("cache").join("summary.svg")
}

#[test_log::test(tokio::test)]
async fn test_refresh_command_with_mock_feeds() {
    let mock_server = test_utils::create_feed_server(
        (200, test_utils::COUNTRIES_JSON),
        (200, test_utils::RATES_JSON),
    )
    .await;
    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, &mock_server.uri());

    let result = ccx::run_command(
        ccx::AppCommand::Refresh,
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Refresh command failed with: {:?}",
        result.err()
    );

    let svg = fs::read_to_string(artifact_in(&dir)).unwrap();
    info!(%svg, "Rendered summary");
    assert!(svg.contains("Total countries: 3"));
    assert!(svg.contains("Nigeria — NGN — est_gdp:"));
    assert!(svg.contains("Antarctica — N/A — est_gdp: 0.00"));
    assert!(!svg.contains("Kosovo"));
}

#[test_log::test(tokio::test)]
async fn test_refresh_command_fails_when_rates_feed_down() {
    let mock_server = test_utils::create_feed_server(
        (200, test_utils::COUNTRIES_JSON),
        (500, "upstream exploded"),
    )
    .await;
    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, &mock_server.uri());

    let err = ccx::run_command(
        ccx::AppCommand::Refresh,
        Some(config_path.to_str().unwrap()),
    )
    .await
    .unwrap_err();

    let refresh_err = err
        .downcast_ref::<RefreshError>()
        .expect("error should be a RefreshError");
    assert_eq!(refresh_err.failed_source(), Some(SourceKind::Rates));
    assert!(!artifact_in(&dir).exists());
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.yaml");

    let err = ccx::run_command(ccx::AppCommand::Status, Some(missing.to_str().unwrap()))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test_log::test(tokio::test)]
async fn test_rest_api_end_to_end() {
    use ccx::api::{AppState, Server};
    use ccx::config::AppConfig;

    let mock_server = test_utils::create_feed_server(
        (200, test_utils::COUNTRIES_JSON),
        (200, test_utils::RATES_JSON),
    )
    .await;
    let dir = TempDir::new().unwrap();
    let config = AppConfig::load_from_path(write_config(&dir, &mock_server.uri())).unwrap();
    let ctx = ccx::AppContext::from_config(config).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let server = Server::new(
        ctx.config.server.clone(),
        AppState::new(ctx.store.clone(), ctx.refresher.clone()),
    );
    let handle = tokio::spawn(async move {
        server.run_with_listener(listener).await.ok();
    });

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{base}/countries/refresh"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Refreshed successfully");
    assert_eq!(body["total"], 3);

    let rows: serde_json::Value = client
        .get(format!("{base}/countries?sort=gdp_desc"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<_> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Nigeria", "Antarctica", "Kosovo"]);
    assert!(rows[2]["estimated_gdp"].is_null());
    assert!(rows[1]["currency_code"].is_null());

    let response = client
        .delete(format!("{base}/countries/KOSOVO"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);

    let status: serde_json::Value = client
        .get(format!("{base}/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["total_countries"], 2);

    let image = client
        .get(format!("{base}/countries/image"))
        .send()
        .await
        .unwrap();
    assert_eq!(image.status(), reqwest::StatusCode::OK);
    assert!(Path::new(&artifact_in(&dir)).exists());

    handle.abort();
}
