use crate::error::{FetchError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_USER_AGENT: &str = "HarvestBot/0.1 (https://github.com/harvest-corpus/harvest)";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// A successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
    /// URL after redirects
    pub final_url: String,
    pub content_type: Option<String>,
}

/// Retrieves one page. Implementations map every failure onto `FetchError`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> std::result::Result<FetchedPage, FetchError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_options(DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT)
    }

    pub fn with_options(timeout_secs: u64, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<FetchedPage, FetchError> {
        debug!("Fetching {}", url);

        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::HttpError(status.as_u16()));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.text().await?;
        debug!(
            "Fetched {} ({} bytes, {:?})",
            final_url,
            body.len(),
            start.elapsed()
        );

        Ok(FetchedPage {
            status: status.as_u16(),
            body,
            final_url,
            content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    #[tokio::test]
    async fn test_fetch_success_reports_body_and_content_type() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wiki/Encryption"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(
                        "<html><body><h1>Encryption</h1></body></html>",
                        "text/html; charset=UTF-8",
                    ),
            )
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let page = fetcher
            .fetch(&format!("{}/wiki/Encryption", mock_server.uri()))
            .await
            .unwrap();

        assert_eq!(page.status, 200);
        assert!(page.body.contains("<h1>Encryption</h1>"));
        assert_eq!(
            page.content_type.as_deref(),
            Some("text/html; charset=UTF-8")
        );
        assert!(page.final_url.ends_with("/wiki/Encryption"));
    }

    #[tokio::test]
    async fn test_fetch_sends_user_agent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("user-agent", "WikiScraperBot/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::with_options(5, "WikiScraperBot/1.0").unwrap();
        let page = fetcher.fetch(&format!("{}/", mock_server.uri())).await;
        assert!(page.is_ok(), "expected matching user agent, got {:?}", page);
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher
            .fetch(&format!("{}/wiki/Missing", mock_server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::NotFound);
    }

    #[tokio::test]
    async fn test_fetch_server_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher
            .fetch(&format!("{}/busy", mock_server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::HttpError(503));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("slow")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::with_options(1, DEFAULT_USER_AGENT).unwrap();
        let err = fetcher
            .fetch(&format!("{}/slow", mock_server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Timeout);
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_network_error() {
        let fetcher = HttpFetcher::with_options(2, DEFAULT_USER_AGENT).unwrap();
        let err = fetcher.fetch("http://127.0.0.1:9/").await.unwrap_err();
        assert!(matches!(err, FetchError::NetworkError(_)), "got {:?}", err);
    }
}
