//! Single-shot page fetching over HTTP.

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use brochure_shared::{BrochureError, Page, Result};

use crate::extract;

/// Conventional browser User-Agent — some company sites refuse
/// obviously-programmatic clients.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36";

/// Maximum redirects to follow per fetch.
const MAX_REDIRECTS: usize = 5;

/// Fetches pages one GET at a time. The underlying client is built once and
/// reused for every fetch in a run.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Create a fetcher with the given request timeout.
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BrochureError::Fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Fetch the raw response body for a URL.
    ///
    /// Fails on connection error, timeout, or non-success status. Never
    /// retried — the caller decides whether the failure aborts the run.
    pub async fn fetch(&self, url: &Url) -> Result<String> {
        debug!(%url, "fetching page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| BrochureError::Fetch(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BrochureError::Fetch(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| BrochureError::Fetch(format!("{url}: body read failed: {e}")))
    }

    /// Fetch a URL and extract it into a [`Page`].
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_page(&self, url: &Url) -> Result<Page> {
        let body = self.fetch(url).await?;
        let extracted = extract::extract(&body);

        debug!(
            title = %extracted.title,
            text_len = extracted.text.len(),
            links = extracted.links.len(),
            "page extracted"
        );

        Ok(Page {
            url: url.to_string(),
            title: extracted.title,
            text: extracted.text,
            links: extracted.links,
            fetched_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><head><title>Example Corp</title></head><body>
        <h1>Welcome</h1>
        <p>We make examples.</p>
        <a href="/about">About</a>
        <a href="/careers">Careers</a>
    </body></html>"#;

    #[tokio::test]
    async fn fetch_page_builds_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(5).unwrap();
        let url = Url::parse(&server.uri()).unwrap();
        let page = fetcher.fetch_page(&url).await.unwrap();

        assert_eq!(page.title, "Example Corp");
        assert!(page.text.contains("We make examples."));
        assert_eq!(page.links, vec!["/about", "/careers"]);
        assert_eq!(page.url, url.to_string());
    }

    #[tokio::test]
    async fn non_success_status_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(5).unwrap();
        let url = Url::parse(&server.uri()).unwrap();
        let err = fetcher.fetch_page(&url).await.unwrap_err();

        assert!(matches!(err, BrochureError::Fetch(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn connection_failure_is_fetch_error() {
        // Port 1 is essentially never listening.
        let fetcher = Fetcher::new(1).unwrap();
        let url = Url::parse("http://127.0.0.1:1/").unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, BrochureError::Fetch(_)));
    }
}
