use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use crate::fetcher::{FetchError, Fetcher};

pub(crate) const LISTING_URL: &str = "http://fake.test/";

/// Listing page with one article card per `(slug, title)`.
pub(crate) fn listing_html(articles: &[(&str, &str)]) -> String {
    let cards: String = articles
        .iter()
        .map(|(slug, title)| {
            format!(
                r#"<a class="article-card" href="/news/{slug}"><div><h3>{title}</h3></div></a>"#
            )
        })
        .collect();
    format!("<html><body><main>{cards}</main></body></html>")
}

/// In-memory [`Fetcher`] recording every existence probe.
#[derive(Debug, Default)]
pub(crate) struct FakeFetcher {
    pages: HashMap<String, Result<String, u16>>,
    existing: HashSet<String>,
    delay: Option<Duration>,
    probes: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), Ok(html.into()));
        self
    }

    pub(crate) fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.pages.insert(url.into(), Err(status));
        self
    }

    pub(crate) fn with_existing(mut self, url: impl Into<String>) -> Self {
        self.existing.insert(url.into());
        self
    }

    /// Makes every page fetch wait before answering.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn probed_urls(&self) -> Vec<String> {
        self.probes.lock().unwrap().clone()
    }

    pub(crate) fn probe_count(&self) -> usize {
        self.probes.lock().unwrap().len()
    }
}

impl Fetcher for FakeFetcher {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.pages.get(url) {
            Some(Ok(html)) => Ok(html.clone()),
            Some(Err(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }

    async fn exists(&self, url: &str) -> bool {
        self.probes.lock().unwrap().push(url.to_string());
        self.existing.contains(url)
    }
}
