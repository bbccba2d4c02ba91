use std::future::Future;
use std::time::Duration;

use reqwest::Client;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },
    #[error("Unreadable response body: {0}")]
    Body(String),
}

/// Network access needed by the scraper: reading a page and checking that a
/// resource exists.
pub trait Fetcher: Send + Sync {
    fn get_text(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;

    /// A failed probe is a normal negative answer, never an error.
    fn exists(&self, url: &str) -> impl Future<Output = bool> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?;

        let status = response.status();
        if !status.is_success() {
            log::error!("{} responded with {}", url, status);
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))
            .map_err(|e| FetchError::Body(e.to_string()))
    }

    async fn exists(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => {
                log::debug!("HEAD {} -> {}", url, response.status());
                response.status().is_success()
            }
            Err(e) => {
                log::debug!("HEAD {} failed: {}", url, e);
                false
            }
        }
    }
}
