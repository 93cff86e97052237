//! The HTTP client for PxWeb queries

use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use std::time::Duration;

use crate::constants::{HTTP_CONNECT_TIMEOUT_SECONDS, HTTP_POOL_MAX_IDLE_PER_HOST};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Creates the client every PxWeb query of a run goes through.
///
/// `timeout_seconds` bounds a whole request. PxWeb itself gives up on heavy
/// queries after 60 seconds with a 503, so the configured value should stay
/// below that. Connecting is bounded separately by the smaller of
/// `timeout_seconds` and [`HTTP_CONNECT_TIMEOUT_SECONDS`], so an unreachable
/// host fails fast and gets retried.
///
/// Every request asks for JSON and names the crate in `User-Agent`.
pub fn create_http_client_with_timeout(timeout_seconds: u64) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .connect_timeout(connect_timeout(timeout_seconds))
        .pool_max_idle_per_host(HTTP_POOL_MAX_IDLE_PER_HOST)
        .default_headers(headers)
        .user_agent(USER_AGENT)
        .build()
}

fn connect_timeout(timeout_seconds: u64) -> Duration {
    Duration::from_secs(timeout_seconds.min(HTTP_CONNECT_TIMEOUT_SECONDS))
}

/// Creates an HTTP client for testing with default timeout
#[cfg(test)]
pub fn create_test_http_client() -> Client {
    create_http_client_with_timeout(crate::constants::DEFAULT_HTTP_TIMEOUT_SECONDS)
        .expect("Failed to create test HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method},
    };

    #[test]
    fn test_connect_timeout_is_capped() {
        assert_eq!(connect_timeout(30), Duration::from_secs(10));
        assert_eq!(connect_timeout(3), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_client_sends_json_accept_and_user_agent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("accept", "application/json"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_http_client();
        let response = client.get(mock_server.uri()).send().await.unwrap();
        assert!(response.status().is_success());
    }
}
