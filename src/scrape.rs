use crate::fetchers::{FetchError, Fetcher};
use crate::parsers::{self, ExtractError};
use crate::results::{ContentItem, NewItem};
use crate::store::{ContentStore, StoreError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use url::Url;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Only HTTP and HTTPS protocols are supported")]
    UnsupportedScheme(String),
    #[error("Timed out after {0} seconds fetching the page")]
    Timeout(u64),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Coarse stage of a scrape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeStatus {
    Fetching,
    Processing,
    Storing,
    Complete,
    Error,
}

/// Progress report published while a scrape runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeProgress {
    pub status: ScrapeStatus,
    /// Percentage, 0–100
    pub progress: u8,
    pub error: Option<String>,
}

impl ScrapeProgress {
    fn new(status: ScrapeStatus, progress: u8) -> Self {
        Self {
            status,
            progress,
            error: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            status: ScrapeStatus::Error,
            progress: 0,
            error: Some(message),
        }
    }
}

/// What a successful scrape stored
#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    pub record_id: u64,
    pub items: Vec<ContentItem>,
}

/// Runs fetch → extract → store for one URL and selector
pub struct Scraper<F: Fetcher> {
    fetcher: F,
    store: ContentStore,
    fetch_timeout: Duration,
    progress_tx: Option<mpsc::UnboundedSender<ScrapeProgress>>,
}

impl<F: Fetcher> Scraper<F> {
    /// Create a scraper writing into `store`
    pub fn new(fetcher: F, store: ContentStore) -> Self {
        Self {
            fetcher,
            store,
            fetch_timeout: Duration::from_secs(45),
            progress_tx: None,
        }
    }

    /// Set the fetch timeout
    pub fn with_fetch_timeout(mut self, timeout_seconds: u64) -> Self {
        self.fetch_timeout = Duration::from_secs(timeout_seconds);
        self
    }

    /// Publish progress reports on `tx`
    pub fn with_progress(mut self, tx: mpsc::UnboundedSender<ScrapeProgress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// The store this scraper writes to
    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Scrape `url`, keep the nodes matching `selector` and append them to the store
    pub async fn scrape(&self, url: &str, selector: &str) -> Result<ScrapeOutcome, ScrapeError> {
        match self.run(url, selector).await {
            Ok(outcome) => {
                self.report(ScrapeProgress::new(ScrapeStatus::Complete, 100));
                ::log::info!(
                    "Stored {} items from {} in record {}",
                    outcome.items.len(),
                    url,
                    outcome.record_id
                );
                Ok(outcome)
            }
            Err(e) => {
                ::log::error!("Scrape of {} failed: {}", url, e);
                self.report(ScrapeProgress::failed(e.to_string()));
                Err(e)
            }
        }
    }

    async fn run(&self, url: &str, selector: &str) -> Result<ScrapeOutcome, ScrapeError> {
        let (url, parsed) = validate_input(url, selector)?;

        self.report(ScrapeProgress::new(ScrapeStatus::Fetching, 10));
        ::log::info!("Fetching {}", parsed);
        let html = tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(&parsed))
            .await
            .map_err(|_| ScrapeError::Timeout(self.fetch_timeout.as_secs()))??;

        self.report(ScrapeProgress::new(ScrapeStatus::Processing, 40));
        let items = parsers::extract(&html, selector)?;
        ::log::debug!("Extracted {} items from {}", items.len(), url);

        self.report(ScrapeProgress::new(ScrapeStatus::Storing, 70));
        let record_id = self
            .store
            .append_or_create(url, items.iter().cloned().map(NewItem::from).collect())
            .await?;

        Ok(ScrapeOutcome { record_id, items })
    }

    fn report(&self, progress: ScrapeProgress) {
        if let Some(tx) = &self.progress_tx {
            // receiver may have gone away; progress is advisory
            let _ = tx.send(progress);
        }
    }
}

/// Checks that both fields are present and the URL is an absolute http(s) URL
///
/// Returns the trimmed URL, which is the key content is stored under,
/// together with its parsed form.
pub fn validate_input<'a>(url: &'a str, selector: &str) -> Result<(&'a str, Url), ScrapeError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ScrapeError::InvalidInput("URL is required".to_string()));
    }
    if selector.trim().is_empty() {
        return Err(ScrapeError::InvalidInput(
            "CSS selector is required".to_string(),
        ));
    }

    let parsed = Url::parse(url)
        .map_err(|_| ScrapeError::InvalidInput("Please enter a valid URL".to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok((url, parsed)),
        other => Err(ScrapeError::UnsupportedScheme(other.to_string())),
    }
}
