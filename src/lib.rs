pub mod config;
pub mod export;
pub mod fetchers;
pub mod ident;
pub mod parsers;
pub mod results;
pub mod scrape;
pub mod store;
pub mod utils;

// Re-export commonly used types for convenience
pub use ident::ItemId;
pub use results::{ContentItem, NewItem, Record};
pub use scrape::{ScrapeError, ScrapeProgress, ScrapeStatus, Scraper};
pub use store::{ContentStore, StoreError};

use config::{FetcherKind, ScraperConfig};
use fetchers::{FetchError, Fetcher, HttpFetcher, WebDriverFetcher};

/// Build the fetcher selected by `config`
pub fn fetcher_from_config(config: &ScraperConfig) -> Result<Box<dyn Fetcher>, FetchError> {
    Ok(match config.fetcher {
        FetcherKind::Http => Box::new(HttpFetcher::new(&config.user_agent)?),
        FetcherKind::WebDriver => Box::new(WebDriverFetcher::new(config.webdriver_url.clone())),
    })
}
