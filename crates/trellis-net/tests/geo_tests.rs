//! Integration tests for the geolocation client.

use trellis_net::geo::{DEFAULT_BASE_URL, IpApiClient};

#[test]
fn test_default_endpoint() {
    let client = IpApiClient::new().expect("Failed to build client");
    assert_eq!(client.base_url(), DEFAULT_BASE_URL);
}

#[cfg(feature = "integration-tests")]
mod integration_tests {
    use super::*;
    use trellis_net::NetworkError;
    use trellis_net::geo::{GeoLocator, IpApiRequest};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_lookup_maps_location() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/23.81.0.59/"))
            .and(query_param("access_key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ip": "23.81.0.59",
                "country_code": "US",
                "region_name": "Virginia",
                "city": "Ashburn",
                "connection": {"asn": 14618, "isp": "Example ISP"}
            })))
            .mount(&mock_server)
            .await;

        let client = IpApiClient::new()
            .expect("Failed to build client")
            .with_base_url(mock_server.uri());

        let location = client.lookup("23.81.0.59", "secret").await.expect("lookup failed");
        assert_eq!(location.city, "Ashburn");
        assert_eq!(location.region_name, "Virginia");
        assert_eq!(location.country_code, "US");

        let full = client
            .location_info(&IpApiRequest::new("23.81.0.59", "secret"))
            .await
            .expect("lookup failed");
        assert_eq!(full.connection.and_then(|c| c.asn), Some(14618));
    }

    #[tokio::test]
    async fn test_service_error_document() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "error": {"code": 101, "type": "invalid_access_key", "info": "bad key"}
            })))
            .mount(&mock_server)
            .await;

        let client = IpApiClient::new()
            .expect("Failed to build client")
            .with_base_url(mock_server.uri());

        let err = client.lookup("23.81.0.59", "nope").await.unwrap_err();
        assert!(matches!(err, NetworkError::Api { code: 101, .. }));
    }
}
