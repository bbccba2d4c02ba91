pub mod config;
pub mod fetcher;
pub mod parser;
pub mod refresh;
pub mod scraper;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

pub use config::{DiscoveryLimits, SiteConfig};
pub use fetcher::{FetchError, Fetcher, HttpFetcher};
pub use refresh::Refresher;
pub use scraper::{ScraperError, WebScraper};
