use super::http::get_json;
use crate::core::country::CountryRecord;
use crate::core::error::{ExternalSourceError, SourceKind};
use crate::core::source::CountryCatalogProvider;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Country catalog served as a JSON array of countries (restcountries v2 shape).
pub struct RestCountriesProvider {
    client: reqwest::Client,
    url: String,
    timeout: Option<Duration>,
}

impl RestCountriesProvider {
    pub fn new(url: &str, timeout: Option<Duration>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl CountryCatalogProvider for RestCountriesProvider {
    #[instrument(name = "CountriesFetch", skip(self), fields(url = %self.url))]
    async fn fetch_countries(&self) -> Result<Vec<CountryRecord>, ExternalSourceError> {
        let countries: Vec<CountryRecord> =
            get_json(&self.client, &self.url, SourceKind::Countries, self.timeout).await?;
        debug!(count = countries.len(), "Received country catalog");
        Ok(countries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/all"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    const MOCK_JSON: &str = r#"[
        {
            "name": "Ghana",
            "capital": "Accra",
            "region": "Africa",
            "population": 31072945,
            "flag": "https://flagcdn.com/gh.svg",
            "currencies": [{"code": "GHS", "name": "Ghanaian cedi", "symbol": "₵"}],
            "independent": true
        },
        {
            "name": "Antarctica",
            "region": "Polar",
            "population": 1000,
            "independent": false
        }
    ]"#;

    #[tokio::test]
    async fn test_fetch_countries() {
        let mock_server = create_mock_server(200, MOCK_JSON).await;
        let provider = RestCountriesProvider::new(&format!("{}/v2/all", mock_server.uri()), None);

        let countries = provider.fetch_countries().await.unwrap();
        assert_eq!(countries.len(), 2);
        assert_eq!(countries[0].name.as_deref(), Some("Ghana"));
        assert_eq!(countries[0].capital.as_deref(), Some("Accra"));
        assert_eq!(countries[0].population, Some(31072945.0));
        let currencies = countries[0].currencies.as_ref().unwrap();
        assert_eq!(currencies[0].as_ref().unwrap().code.as_deref(), Some("GHS"));
        assert!(countries[1].currencies.is_none());
    }

    #[tokio::test]
    async fn test_provider_reuses_client_across_fetches() {
        use wiremock::matchers::header;

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/all"))
            .and(header("user-agent", crate::providers::http::USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(2)
            .mount(&mock_server)
            .await;
        let provider = RestCountriesProvider::new(&format!("{}/v2/all", mock_server.uri()), None);

        assert!(provider.fetch_countries().await.unwrap().is_empty());
        assert!(provider.fetch_countries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_countries_tolerates_odd_population() {
        let body = r#"[
            {"name": "Ghana", "population": 31072945},
            {"name": "Oddland", "population": "unknown"},
            {"name": "Nulland", "population": null},
            {"name": "Objland", "population": {"value": 3}}
        ]"#;
        let mock_server = create_mock_server(200, body).await;
        let provider = RestCountriesProvider::new(&format!("{}/v2/all", mock_server.uri()), None);

        let countries = provider.fetch_countries().await.unwrap();
        assert_eq!(countries.len(), 4);
        assert_eq!(countries[0].population, Some(31072945.0));
        assert!(countries[1..].iter().all(|c| c.population.is_none()));
    }

    #[tokio::test]
    async fn test_fetch_countries_non_success_status() {
        let mock_server = create_mock_server(500, "upstream exploded").await;
        let provider = RestCountriesProvider::new(&format!("{}/v2/all", mock_server.uri()), None);

        let err = provider.fetch_countries().await.unwrap_err();
        assert_eq!(err.source_kind, SourceKind::Countries);
        assert!(err.message.contains("500"));
    }

    #[tokio::test]
    async fn test_fetch_countries_malformed_payload() {
        let mock_server = create_mock_server(200, r#"{"message": "not a list"}"#).await;
        let provider = RestCountriesProvider::new(&format!("{}/v2/all", mock_server.uri()), None);

        let err = provider.fetch_countries().await.unwrap_err();
        assert_eq!(err.source_kind, SourceKind::Countries);
    }

    #[tokio::test]
    async fn test_fetch_countries_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("[]")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;
        let provider = RestCountriesProvider::new(
            &format!("{}/v2/all", mock_server.uri()),
            Some(Duration::from_millis(50)),
        );

        let err = provider.fetch_countries().await.unwrap_err();
        assert_eq!(err.source_kind, SourceKind::Countries);
    }
}
