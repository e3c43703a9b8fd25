//! Integration tests for the HTTP client.

use std::time::Duration;

use trellis_net::http::{HttpClient, HttpClientBuilder};

#[tokio::test]
async fn test_client_creation() {
    let client = HttpClient::new().expect("Failed to build client");
    assert_eq!(client.config().timeout, Some(Duration::from_secs(30)));
}

#[tokio::test]
async fn test_client_builder() {
    let client = HttpClientBuilder::new()
        .timeout(Duration::from_secs(60))
        .user_agent("trellis-tests")
        .default_header("Accept", "application/json")
        .expect("valid header")
        .build()
        .expect("Failed to build client");

    assert_eq!(client.config().timeout, Some(Duration::from_secs(60)));
    assert_eq!(client.config().user_agent.as_deref(), Some("trellis-tests"));
}

#[tokio::test]
async fn test_invalid_url_is_reported() {
    let client = HttpClient::new().expect("Failed to build client");
    let result: trellis_net::Result<serde_json::Value> = client.get_json("not a url", &[]).await;
    assert!(matches!(result, Err(trellis_net::NetworkError::InvalidUrl(_))));
}

// Note: We use wiremock for mocked HTTP tests
#[cfg(feature = "integration-tests")]
mod integration_tests {
    use super::*;
    use trellis_net::NetworkError;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_json_with_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/echo"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().expect("Failed to build client");
        let body: serde_json::Value = client
            .get_json(&format!("{}/echo", mock_server.uri()), &[("page", "2")])
            .await
            .expect("Request failed");

        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such thing"))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().expect("Failed to build client");
        let result: trellis_net::Result<serde_json::Value> = client
            .get_json(&format!("{}/missing", mock_server.uri()), &[])
            .await;

        match result {
            Err(NetworkError::HttpStatus { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message.as_deref(), Some("no such thing"));
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let client = HttpClientBuilder::new()
            .timeout(Duration::from_millis(50))
            .build()
            .expect("Failed to build client");
        let result: trellis_net::Result<serde_json::Value> = client
            .get_json(&format!("{}/slow", mock_server.uri()), &[])
            .await;

        assert!(matches!(result, Err(NetworkError::Timeout)));
    }
}
