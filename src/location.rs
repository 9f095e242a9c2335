// Location reference data: single-airport detail by IATA code and keyword search

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::error::ApiError;
use crate::http::AuthenticatedHttpClient;
use crate::supplier::{LocationDetailResponse, LocationInfo, LocationSearchResponse};

pub const LOCATIONS_PATH: &str = "/v1/reference-data/locations";

// Location ids are the IATA code behind a one-letter type marker; A selects airports
pub const AIRPORT_ID_PREFIX: char = 'A';

pub fn airport_location_id(iata_code: &str) -> String {
    format!("{}{}", AIRPORT_ID_PREFIX, iata_code)
}

#[async_trait]
pub trait LocationLookup: Send + Sync + 'static {
    // Ok(None) means the upstream has no such location; Err is a genuine failure
    async fn lookup(&self, iata_code: &str) -> Result<Option<LocationInfo>, ApiError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationSearchRequest {
    pub sub_type: String,
    pub keyword: String,
    pub country_code: Option<String>,
    pub limit: u32,
    pub offset: u32,
    pub sort: String,
    pub view: String,
}

impl LocationSearchRequest {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const DEFAULT_SORT: &'static str = "analytics.travelers.score";
    pub const DEFAULT_VIEW: &'static str = "FULL";

    pub fn new(sub_type: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            sub_type: sub_type.into(),
            keyword: keyword.into(),
            country_code: None,
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
            sort: Self::DEFAULT_SORT.to_string(),
            view: Self::DEFAULT_VIEW.to_string(),
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("subType", self.sub_type.clone()),
            ("keyword", self.keyword.clone()),
        ];
        if let Some(country_code) = &self.country_code {
            query.push(("countryCode", country_code.clone()));
        }
        query.push(("page[limit]", self.limit.to_string()));
        query.push(("page[offset]", self.offset.to_string()));
        query.push(("sort", self.sort.clone()));
        query.push(("view", self.view.clone()));
        query
    }
}

pub struct LocationLookupClient {
    client: Arc<AuthenticatedHttpClient>,
    // Found locations only; misses are asked again next time
    known: DashMap<String, LocationInfo>,
}

impl LocationLookupClient {
    pub fn new(client: Arc<AuthenticatedHttpClient>) -> Self {
        Self {
            client,
            known: DashMap::new(),
        }
    }

    pub async fn search(
        &self,
        request: &LocationSearchRequest,
    ) -> Result<LocationSearchResponse, ApiError> {
        debug!(keyword = %request.keyword, sub_type = %request.sub_type, "Searching locations");
        self.client
            .get_json(LOCATIONS_PATH, &request.to_query())
            .await
    }

    pub fn memoized_count(&self) -> usize {
        self.known.len()
    }
}

#[async_trait]
impl LocationLookup for LocationLookupClient {
    async fn lookup(&self, iata_code: &str) -> Result<Option<LocationInfo>, ApiError> {
        if let Some(known) = self.known.get(iata_code) {
            return Ok(Some(known.clone()));
        }

        let path = format!("{}/{}", LOCATIONS_PATH, airport_location_id(iata_code));
        let detail = match self.client.get_json::<LocationDetailResponse>(&path, &[]).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                debug!(iata_code, "No location found upstream");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let info = detail
            .data
            .and_then(|data| data.address)
            .map(|address| LocationInfo::from(&address));

        match &info {
            Some(found) => {
                self.known.insert(iata_code.to_string(), found.clone());
            }
            None => debug!(iata_code, "Location response carried no address"),
        }
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TOKEN_PATH;
    use crate::config::ClientConfig;
    use test_case::test_case;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn lookup_client(server: &MockServer) -> LocationLookupClient {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "token",
                "expires_in": 1799
            })))
            .mount(server)
            .await;

        let config = ClientConfig {
            base_url: server.uri(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            ..ClientConfig::default()
        };
        LocationLookupClient::new(Arc::new(
            AuthenticatedHttpClient::from_config(&config).unwrap(),
        ))
    }

    #[test_case("JFK", "AJFK"; "#1 airport code")]
    #[test_case("XXX", "AXXX"; "#2 unknown code")]
    fn test_airport_location_id(iata: &str, expected: &str) {
        assert_eq!(airport_location_id(iata), expected);
    }

    #[tokio::test]
    async fn test_lookup_maps_address_and_memoizes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/reference-data/locations/ACDG"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "meta": {"links": {"self": "x"}},
                "data": {
                    "type": "location",
                    "subType": "AIRPORT",
                    "name": "CHARLES DE GAULLE",
                    "iataCode": "CDG",
                    "address": {
                        "cityName": "PARIS",
                        "cityCode": "PAR",
                        "countryName": "FRANCE",
                        "countryCode": "FR",
                        "regionCode": "EUROP"
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = lookup_client(&server).await;
        for _ in 0..3 {
            let info = client.lookup("CDG").await.unwrap().unwrap();
            assert_eq!(info.city_name.as_deref(), Some("PARIS"));
            assert_eq!(info.country_name.as_deref(), Some("FRANCE"));
            assert_eq!(info.city_code.as_deref(), Some("PAR"));
        }
        assert_eq!(client.memoized_count(), 1);
    }

    #[tokio::test]
    async fn test_lookup_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/reference-data/locations/AXXX"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "errors": [{"status": 404, "code": 1797, "title": "NOT FOUND"}]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = lookup_client(&server).await;
        assert_eq!(client.lookup("XXX").await.unwrap(), None);
        // misses are not memoized
        assert_eq!(client.lookup("XXX").await.unwrap(), None);
        assert_eq!(client.memoized_count(), 0);
    }

    #[tokio::test]
    async fn test_lookup_server_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/reference-data/locations/ABAD"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let client = lookup_client(&server).await;
        let err = client.lookup("BAD").await.unwrap_err();
        assert!(matches!(err, ApiError::UpstreamError { status_code: 500, .. }));
    }

    #[tokio::test]
    async fn test_lookup_without_address_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/reference-data/locations/AEMP"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": {"iataCode": "EMP"}})))
            .mount(&server)
            .await;

        let client = lookup_client(&server).await;
        assert_eq!(client.lookup("EMP").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_search_passes_all_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LOCATIONS_PATH))
            .and(query_param("subType", "AIRPORT,CITY"))
            .and(query_param("keyword", "PAR"))
            .and(query_param("countryCode", "FR"))
            .and(query_param("page[limit]", "5"))
            .and(query_param("page[offset]", "0"))
            .and(query_param("sort", "analytics.travelers.score"))
            .and(query_param("view", "FULL"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "meta": {"count": 1},
                "data": [{
                    "type": "location",
                    "subType": "CITY",
                    "name": "PARIS",
                    "id": "CPAR",
                    "iataCode": "PAR",
                    "address": {"cityName": "PARIS", "countryName": "FRANCE"}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = lookup_client(&server).await;
        let mut request = LocationSearchRequest::new("AIRPORT,CITY", "PAR");
        request.country_code = Some("FR".to_string());
        request.limit = 5;

        let response = client.search(&request).await.unwrap();
        assert_eq!(response.meta.count, 1);
        assert_eq!(response.data[0].id.as_deref(), Some("CPAR"));
    }

    #[tokio::test]
    async fn test_search_404_stays_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LOCATIONS_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such resource"))
            .expect(1)
            .mount(&server)
            .await;

        let client = lookup_client(&server).await;
        let err = client
            .search(&LocationSearchRequest::new("AIRPORT", "ZZZ"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ApiError::UpstreamError {
                status_code: 404,
                body: "no such resource".to_string()
            }
        );
    }

    #[test]
    fn test_search_query_omits_missing_country() {
        let query = LocationSearchRequest::new("CITY", "LON").to_query();
        assert!(query.iter().all(|(k, _)| *k != "countryCode"));
        assert!(query.contains(&("page[limit]", "10".to_string())));
    }
}
