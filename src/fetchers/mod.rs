pub mod http;
pub mod webdriver;

pub use http::HttpFetcher;
pub use webdriver::WebDriverFetcher;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to fetch URL: {status} - {reason}")]
    Status { status: u16, reason: String },
    #[error("URL must point to an HTML page (got {0})")]
    NotHtml(String),
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("WebDriver error: {0}")]
    WebDriver(String),
}

/// Source of raw HTML documents
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieve the document at `url`
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// Serves the same document for every URL
#[derive(Debug, Clone)]
pub struct StaticFetcher {
    html: String,
}

impl StaticFetcher {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        ::log::debug!("Serving static document for {}", url);
        Ok(self.html.clone())
    }
}

#[async_trait]
impl Fetcher for Box<dyn Fetcher> {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        (**self).fetch(url).await
    }
}
