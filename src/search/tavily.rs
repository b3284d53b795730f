//! Tavily search API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::{SearchProvider, SearchResponse};
use crate::error::SearchError;

/// Default Tavily API endpoint.
pub const TAVILY_BASE_URL: &str = "https://api.tavily.com";

/// Tavily search client.
pub struct TavilyClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct SearchBody<'a> {
    query: &'a str,
    max_results: u32,
}

impl TavilyClient {
    /// Creates a client against the public Tavily endpoint.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, SearchError> {
        Self::with_base_url(api_key, TAVILY_BASE_URL, timeout)
    }

    /// Creates a client against a custom endpoint (proxies, tests).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl std::fmt::Debug for TavilyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilyClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    fn name(&self) -> &'static str {
        "tavily"
    }

    async fn search(&self, query: &str, max_results: u32) -> Result<SearchResponse, SearchError> {
        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&SearchBody { query, max_results })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(provider = "tavily", %body, "raw search response");
        serde_json::from_str(&body).map_err(|e| SearchError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> TavilyClient {
        TavilyClient::with_base_url("tvly-test", server.uri(), Duration::from_secs(5))
            .unwrap_or_else(|e| unreachable!("{e}"))
    }

    #[tokio::test]
    async fn test_search_parses_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("authorization", "Bearer tvly-test"))
            .and(body_partial_json(json!({"query": "rust", "max_results": 3})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": "rust",
                "results": [
                    {"title": "Rust", "url": "https://rust-lang.org", "content": "A language", "score": 0.9}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client
            .search("rust", 3)
            .await
            .unwrap_or_else(|e| unreachable!("{e}"));

        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].title.as_deref(), Some("Rust"));
        assert_eq!(response.results[0].content.as_deref(), Some("A language"));
        assert!(response.results[0].snippet.is_none());
    }

    #[tokio::test]
    async fn test_search_maps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(432).set_body_string("plan limit exceeded"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.search("rust", 5).await.err();

        match err {
            Some(SearchError::Status { status, body }) => {
                assert_eq!(status, 432);
                assert_eq!(body, "plan limit exceeded");
            }
            other => unreachable!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_rejects_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.search("rust", 5).await.err();
        assert!(matches!(err, Some(SearchError::Decode(_))));
    }
}
