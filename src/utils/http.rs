// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONNECTION, USER_AGENT};

use crate::error::{AppError, Result};
use crate::models::{CrawlerConfig, RateLimitConfig};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// A fetched page: status code and body, whatever the status.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Source of HTML pages for the extractors.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url` presenting `identity` as the User-Agent.
    ///
    /// Non-2xx statuses are returned as pages, not errors; only transport
    /// failures (DNS, timeout, reset) are `Err`.
    async fn fetch(&self, url: &str, identity: &str) -> Result<FetchedPage>;
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(
    rate_limit: &RateLimitConfig,
    proxy: Option<&str>,
) -> Result<reqwest::Client> {
    let mut builder =
        reqwest::Client::builder().timeout(Duration::from_millis(rate_limit.timeout_ms));

    if let Some(proxy) = proxy {
        let proxy_url = if proxy.contains("://") {
            proxy.to_string()
        } else {
            format!("http://{proxy}")
        };
        builder = builder.proxy(reqwest::Proxy::all(&proxy_url)?);
    }

    Ok(builder.build()?)
}

/// reqwest-backed page fetcher sending a browser-like header set.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    accept_language: String,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client, accept_language: impl Into<String>) -> Self {
        Self {
            client,
            accept_language: accept_language.into(),
        }
    }

    /// Build a fetcher from configuration, honoring an optional proxy override.
    pub fn from_config(
        crawler: &CrawlerConfig,
        rate_limit: &RateLimitConfig,
        proxy: Option<&str>,
    ) -> Result<Self> {
        let proxy = proxy.or(crawler.proxy.as_deref());
        let client = create_async_client(rate_limit, proxy)?;
        Ok(Self::new(client, crawler.accept_language.clone()))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, identity: &str) -> Result<FetchedPage> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, identity)
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, &self.accept_language)
            .header(CONNECTION, "keep-alive")
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        log::debug!("GET {} -> {}", url, status);

        Ok(FetchedPage { status, body })
    }
}

/// Turn a non-success page into an error.
pub fn ensure_success(page: FetchedPage, url: &str) -> Result<FetchedPage> {
    if page.is_success() {
        Ok(page)
    } else {
        Err(AppError::Status {
            status: page.status,
            url: url.to_string(),
        })
    }
}
