use super::{FetchError, Fetcher};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use url::Url;

/// Ports tried when the configured WebDriver is unreachable
const FALLBACK_URLS: [&str; 3] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://127.0.0.1:4444",
];

/// Fetches the rendered page source through a WebDriver session
///
/// A fresh session is opened per fetch and closed afterwards, so pages
/// that build their content with JavaScript are extracted as rendered.
pub struct WebDriverFetcher {
    webdriver_url: String,
}

impl WebDriverFetcher {
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
        }
    }

    async fn connect(&self) -> Result<Client, FetchError> {
        match ClientBuilder::native().connect(&self.webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", self.webdriver_url);
                return Ok(client);
            }
            Err(e) => {
                ::log::warn!(
                    "Failed to connect to WebDriver at {}: {}",
                    self.webdriver_url,
                    e
                );
            }
        }

        for url in FALLBACK_URLS {
            if url == self.webdriver_url {
                continue;
            }
            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = ClientBuilder::native().connect(url).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(client);
            }
        }

        Err(FetchError::WebDriver(format!(
            "no WebDriver server reachable at {}; set WEBDRIVER_URL to point at one",
            self.webdriver_url
        )))
    }
}

#[async_trait]
impl Fetcher for WebDriverFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let client = self.connect().await?;

        let result = async {
            client
                .goto(url.as_str())
                .await
                .map_err(|e| FetchError::WebDriver(format!("accessing {}: {}", url, e)))?;
            client
                .source()
                .await
                .map_err(|e| FetchError::WebDriver(format!("getting source for {}: {}", url, e)))
        }
        .await;

        if let Err(e) = client.close().await {
            ::log::warn!("Failed to close WebDriver session: {}", e);
        }

        result
    }
}
