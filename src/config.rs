use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// How pages are retrieved before extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetcherKind {
    /// Plain HTTP GET
    #[default]
    Http,
    /// Rendered source through a WebDriver server
    WebDriver,
}

/// Configuration for the scraper and its store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// JSON file holding the stored records
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Which fetcher to use
    #[serde(default)]
    pub fetcher: FetcherKind,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Upper bound on a single page fetch
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// User-Agent header sent by the HTTP fetcher
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Default value for store_path
fn default_store_path() -> PathBuf {
    PathBuf::from("scraped-content.store.json")
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

/// Default value for fetch_timeout_secs
fn default_fetch_timeout_secs() -> u64 {
    45
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            fetcher: FetcherKind::default(),
            webdriver_url: default_webdriver_url(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ScraperConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Override settings from `WEBDRIVER_URL` and `SCRAPE_STORE_PATH`
    pub fn apply_env(mut self) -> Self {
        self.apply_overrides(
            std::env::var("WEBDRIVER_URL").ok(),
            std::env::var("SCRAPE_STORE_PATH").ok(),
        );
        self
    }

    fn apply_overrides(&mut self, webdriver_url: Option<String>, store_path: Option<String>) {
        if let Some(url) = webdriver_url.filter(|u| !u.is_empty()) {
            self.webdriver_url = url;
        }
        if let Some(path) = store_path.filter(|p| !p.is_empty()) {
            self.store_path = PathBuf::from(path);
        }
    }
}
