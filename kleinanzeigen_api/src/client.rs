//! HTTP client for Kleinanzeigen search-results and detail pages.

use std::time::Duration;

use url::Url;

use crate::{query::SearchQuery, user_agent::DEFAULT_USER_AGENT, Error};

/// Production marketplace root.
pub const DEFAULT_BASE_URL: &str = "https://www.kleinanzeigen.de";

/// Upper bound for a single request, connect through body.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the Kleinanzeigen website.
///
/// Sends every request with a fixed browser `User-Agent` and German
/// `Accept-Language`. The underlying `reqwest::Client` is built once and
/// carries the request timeout, so no call can hang indefinitely.
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    /// Creates a client pointing at the production marketplace.
    pub fn new() -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::with_options(base_url, DEFAULT_USER_AGENT, DEFAULT_TIMEOUT)
    }

    /// Creates a client with explicit base URL, user agent and timeout.
    pub fn with_options(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, Error> {
        let base_url = Url::parse(base_url).map_err(|e| {
            tracing::error!("Invalid base URL {}: {}", base_url, e);
            Error::InvalidUrl(format!("{}: {}", base_url, e))
        })?;
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed(e.to_string())
            })?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL of the search-results page described by `query`.
    pub fn search_url(&self, query: &SearchQuery) -> Url {
        query.add_to_url(&self.base_url)
    }

    /// Fetches one search-results page and returns its HTML.
    pub async fn get_search_page(&self, query: &SearchQuery) -> Result<String, Error> {
        let url = self.search_url(query);
        self.fetch_html(url.as_str()).await
    }

    /// Fetches an arbitrary page (typically a listing detail page) by absolute URL.
    pub async fn get_page(&self, url: &str) -> Result<String, Error> {
        let url = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
        self.fetch_html(url.as_str()).await
    }

    async fn fetch_html(&self, url: &str) -> Result<String, Error> {
        let resp = self
            .http
            .get(url)
            .header("accept", "text/html,application/xhtml+xml")
            .header("accept-language", "de-DE,de;q=0.9,en;q=0.5")
            .header("cache-control", "no-cache")
            .send()
            .await
            .map_err(|e| {
                tracing::debug!("Failed to get {}: {}", url, e);
                Error::RequestFailed(e.to_string())
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::debug!("Failed to read response body from {}: {}", url, e);
            Error::RequestFailed(e.to_string())
        })?;

        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 500;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_body_short() {
        assert_eq!(truncate_body("Not Found"), "Not Found");
    }

    #[test]
    fn test_truncate_body_respects_char_boundary() {
        let body = "ä".repeat(400);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("...[truncated]"));
        assert!(truncated.len() <= 500 + "...[truncated]".len());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            Client::with_base_url("not a url"),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = Client::with_base_url("http://localhost:9999").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:9999/");
    }

    #[test]
    fn test_search_url_uses_base() {
        let client = Client::with_base_url("http://localhost:9999").unwrap();
        let url = client.search_url(&SearchQuery::new("lampe").with_page(4));
        assert_eq!(url.as_str(), "http://localhost:9999/s-seite:4/lampe/k0");
    }
}
