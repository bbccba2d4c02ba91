//! Single-flight wrapper around [`WebScraper`].
//!
//! A refresh requested while another one of the same [`Refresher`] is still
//! running is rejected with [`ScraperError::RefreshInProgress`] instead of
//! being queued. Nothing is kept between refreshes.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::fetcher::{Fetcher, HttpFetcher};
use crate::scraper::{ScraperError, WebScraper};
use crate::types::{Article, Illustration};

#[derive(Debug)]
pub struct Refresher<F = HttpFetcher> {
    scraper: WebScraper<F>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the refresh finishes, fails or is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<F: Fetcher> Refresher<F> {
    pub fn new(scraper: WebScraper<F>) -> Self {
        Self {
            scraper,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn refresh_articles(&self) -> Result<Vec<Article>, ScraperError> {
        let _guard = self.begin()?;
        self.scraper.list_articles().await
    }

    pub async fn refresh_illustrations(&self) -> Result<Vec<Illustration>, ScraperError> {
        let _guard = self.begin()?;
        self.scraper.discover_illustrations().await
    }

    fn begin(&self) -> Result<InFlight<'_>, ScraperError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| {
                log::warn!("Refresh requested while another one is running, ignoring");
                ScraperError::RefreshInProgress
            })?;
        Ok(InFlight(&self.in_flight))
    }
}
