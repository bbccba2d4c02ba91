use std::pin::pin;

use futures::stream::{self, StreamExt};

use crate::config::{DiscoveryLimits, SiteConfig};
use crate::fetcher::{FetchError, Fetcher, HttpFetcher};
use crate::parser::{SlugDate, parse_article_list};
use crate::types::{Article, Illustration};

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("Network error: {0}")]
    Network(#[from] FetchError),
    #[error("No illustrations found")]
    NotFound,
    #[error("A refresh is already in progress")]
    RefreshInProgress,
    #[error("Invalid discovery limits: {0}")]
    InvalidLimits(String),
}

#[derive(Debug, Clone)]
pub struct WebScraper<F = HttpFetcher> {
    fetcher: F,
    site: SiteConfig,
    limits: DiscoveryLimits,
}

impl WebScraper<HttpFetcher> {
    pub fn new() -> Result<Self, ScraperError> {
        Self::with_site(SiteConfig::default(), DiscoveryLimits::default())
    }

    pub fn with_site(site: SiteConfig, limits: DiscoveryLimits) -> Result<Self, ScraperError> {
        Self::with_fetcher(HttpFetcher::new()?, site, limits)
    }
}

impl<F: Fetcher> WebScraper<F> {
    pub fn with_fetcher(
        fetcher: F,
        site: SiteConfig,
        limits: DiscoveryLimits,
    ) -> Result<Self, ScraperError> {
        let limits = limits.validate().map_err(ScraperError::InvalidLimits)?;
        Ok(Self {
            fetcher,
            site,
            limits,
        })
    }

    /// Articles of the listing page, newest first.
    pub async fn list_articles(&self) -> Result<Vec<Article>, ScraperError> {
        log::info!("Fetching article listing from {}...", self.site.listing_url);
        let html = self.fetcher.get_text(&self.site.listing_url).await?;
        let articles = parse_article_list(&html, &self.site);
        log::info!("Found {} article(s)", articles.len());
        Ok(articles)
    }

    /// Lists the articles and probes them for illustrations.
    pub async fn discover_illustrations(&self) -> Result<Vec<Illustration>, ScraperError> {
        let articles = self.list_articles().await?;
        self.probe_illustrations(&articles).await
    }

    /// Probes `illust<N>.png` of the newest articles until enough images are found.
    ///
    /// Probes run through an ordered buffer, so results are consumed in
    /// candidate order whatever the concurrency and the outcome matches a
    /// one-at-a-time run. Once the cap is reached the remaining probes are
    /// dropped; with a concurrency of `n` at most `n - 1` extra requests were
    /// already in flight.
    pub async fn probe_illustrations(
        &self,
        articles: &[Article],
    ) -> Result<Vec<Illustration>, ScraperError> {
        let candidates = self.illustration_candidates(articles);
        let max = self.limits.max_illustrations;
        log::info!(
            "Probing up to {} illustration URL(s) across {} article(s)...",
            candidates.len(),
            articles.len().min(self.limits.max_articles)
        );

        let fetcher = &self.fetcher;
        let mut probes = pin!(
            stream::iter(candidates)
                .map(|candidate| async move {
                    let exists = fetcher.exists(&candidate.image_url).await;
                    (candidate, exists)
                })
                .buffered(self.limits.concurrency)
        );

        let mut found = Vec::new();
        while let Some((candidate, exists)) = probes.next().await {
            if !exists {
                continue;
            }
            log::info!("Illustration found: {}", candidate.image_url);
            found.push(candidate);
            if found.len() >= max {
                break;
            }
        }

        if found.is_empty() {
            return Err(ScraperError::NotFound);
        }

        found.sort_by(|a, b| b.sort_key.cmp(&a.sort_key));
        found.truncate(max);
        log::info!("Discovered {} illustration(s)", found.len());
        Ok(found)
    }

    fn illustration_candidates(&self, articles: &[Article]) -> Vec<Illustration> {
        let site = &self.site;
        let per_article = self.limits.illustrations_per_article;

        articles
            .iter()
            .take(self.limits.max_articles)
            .filter_map(|article| match SlugDate::parse(&article.slug) {
                Some(date) => Some((article, date)),
                None => {
                    log::debug!("No date in slug '{}', not probing", article.slug);
                    None
                }
            })
            .flat_map(|(article, date)| {
                (1..=per_article).map(move |index| Illustration {
                    image_url: site.illustration_url(
                        &date.year_segment(),
                        &date.month_segment(),
                        &article.slug,
                        index,
                    ),
                    article_url: article.url.clone(),
                    article_title: article.title.clone(),
                    published_date: date.published_label(),
                    index,
                    sort_key: format!("{}_{}", article.sort_key, index),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FakeFetcher, LISTING_URL, listing_html};

    fn scraper(fetcher: FakeFetcher) -> WebScraper<FakeFetcher> {
        WebScraper::with_fetcher(
            fetcher,
            SiteConfig::with_base_url("http://fake.test"),
            DiscoveryLimits::default(),
        )
        .unwrap()
    }

    fn image_url(slug: &str, index: u8) -> String {
        let date = SlugDate::parse(slug).unwrap();
        SiteConfig::with_base_url("http://fake.test").illustration_url(
            &date.year_segment(),
            &date.month_segment(),
            slug,
            index,
        )
    }

    #[tokio::test]
    async fn test_list_articles_newest_first() {
        let html = listing_html(&[
            ("24060101-a", "六月一日のニュースです"),
            ("24060301-c", "六月三日のニュースです"),
            ("24060201-b", "六月二日のニュースです"),
        ]);
        let scraper = scraper(FakeFetcher::new().with_page(LISTING_URL, html));

        let articles = scraper.list_articles().await.unwrap();

        let slugs: Vec<&str> = articles.iter().map(|a| a.slug.as_str()).collect();
        assert_eq!(slugs, vec!["24060301-c", "24060201-b", "24060101-a"]);
        assert_eq!(articles[0].url, "http://fake.test/news/24060301-c");
    }

    #[tokio::test]
    async fn test_one_illustration_per_article() {
        let slugs = ["24061001-first", "24061201-third", "24061101-second"];
        let html = listing_html(&[
            (slugs[0], "一本目のニュースです"),
            (slugs[1], "三本目のニュースです"),
            (slugs[2], "二本目のニュースです"),
        ]);
        let mut fetcher = FakeFetcher::new().with_page(LISTING_URL, html);
        for slug in slugs {
            fetcher = fetcher.with_existing(image_url(slug, 1));
        }
        let scraper = scraper(fetcher);

        let illustrations = scraper.discover_illustrations().await.unwrap();

        assert_eq!(illustrations.len(), 3);
        assert!(illustrations.iter().all(|i| i.index == 1));
        let urls: Vec<&str> = illustrations.iter().map(|i| i.article_url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "http://fake.test/news/24061201-third",
                "http://fake.test/news/24061101-second",
                "http://fake.test/news/24061001-first",
            ]
        );

        let newest = &illustrations[0];
        assert_eq!(
            newest.image_url,
            "http://fake.test/images/articles/2024/06/24061201-third/illust1.png"
        );
        assert_eq!(newest.article_title, "三本目のニュースです");
        assert_eq!(newest.published_date, "2024年06月12日");
        assert_eq!(newest.sort_key, "2024061201_1");
    }

    #[tokio::test]
    async fn test_stops_probing_after_cap() {
        let articles: Vec<(String, String)> = (1..=20)
            .map(|day| {
                (
                    format!("2406{:02}01-article", day),
                    format!("六月{}日のニュースです", day),
                )
            })
            .collect();
        let refs: Vec<(&str, &str)> = articles
            .iter()
            .map(|(s, t)| (s.as_str(), t.as_str()))
            .collect();

        let mut fetcher = FakeFetcher::new().with_page(LISTING_URL, listing_html(&refs));
        for (slug, _) in &articles {
            for index in 1..=3 {
                fetcher = fetcher.with_existing(image_url(slug, index));
            }
        }
        let scraper = scraper(fetcher);

        let illustrations = scraper.discover_illustrations().await.unwrap();

        assert_eq!(illustrations.len(), 10);
        assert_eq!(scraper.fetcher.probe_count(), 10);

        // Newest four articles (20th to 17th of June) cover the first ten probes.
        assert_eq!(illustrations[0].sort_key, "2024062001_3");
        assert_eq!(illustrations[9].sort_key, "2024061701_1");
    }

    #[tokio::test]
    async fn test_concurrent_probing_matches_sequential_result() {
        let articles: Vec<(String, String)> = (1..=12)
            .map(|day| {
                (
                    format!("2407{:02}02-article", day),
                    format!("七月{}日のニュースです", day),
                )
            })
            .collect();
        let refs: Vec<(&str, &str)> = articles
            .iter()
            .map(|(s, t)| (s.as_str(), t.as_str()))
            .collect();

        let build = |concurrency| {
            let mut fetcher = FakeFetcher::new().with_page(LISTING_URL, listing_html(&refs));
            for (i, (slug, _)) in articles.iter().enumerate() {
                if i % 2 == 0 {
                    fetcher = fetcher.with_existing(image_url(slug, 2));
                }
                fetcher = fetcher.with_existing(image_url(slug, 3));
            }
            WebScraper::with_fetcher(
                fetcher,
                SiteConfig::with_base_url("http://fake.test"),
                DiscoveryLimits {
                    concurrency,
                    ..Default::default()
                },
            )
            .unwrap()
        };

        let sequential = build(1);
        let concurrent = build(4);

        let expected = sequential.discover_illustrations().await.unwrap();
        let actual = concurrent.discover_illustrations().await.unwrap();

        assert_eq!(expected, actual);
        assert!(concurrent.fetcher.probe_count() <= sequential.fetcher.probe_count() + 3);
    }

    #[tokio::test]
    async fn test_considers_at_most_fifteen_articles() {
        let articles: Vec<(String, String)> = (1..=20)
            .map(|day| {
                (
                    format!("2408{:02}01-article", day),
                    format!("八月{}日のニュースです", day),
                )
            })
            .collect();
        let refs: Vec<(&str, &str)> = articles
            .iter()
            .map(|(s, t)| (s.as_str(), t.as_str()))
            .collect();

        // Only the oldest article has an illustration, and it is outside the window.
        let fetcher = FakeFetcher::new()
            .with_page(LISTING_URL, listing_html(&refs))
            .with_existing(image_url("24080101-article", 1));
        let scraper = scraper(fetcher);

        let result = scraper.discover_illustrations().await;

        assert!(matches!(result, Err(ScraperError::NotFound)));
        assert_eq!(scraper.fetcher.probe_count(), 45);
    }

    #[tokio::test]
    async fn test_listing_server_error_is_network_error() {
        let scraper = scraper(FakeFetcher::new().with_status(LISTING_URL, 500));

        let result = scraper.discover_illustrations().await;

        assert!(matches!(
            result,
            Err(ScraperError::Network(FetchError::Status { status: 500, .. }))
        ));
        assert_eq!(scraper.fetcher.probe_count(), 0);
    }

    #[tokio::test]
    async fn test_no_illustrations_is_not_found() {
        let html = listing_html(&[
            ("24090101-a", "九月一日のニュースです"),
            ("24090201-b", "九月二日のニュースです"),
            ("24090301-c", "九月三日のニュースです"),
            ("24090401-d", "九月四日のニュースです"),
            ("24090501-e", "九月五日のニュースです"),
        ]);
        let scraper = scraper(FakeFetcher::new().with_page(LISTING_URL, html));

        let result = scraper.discover_illustrations().await;

        assert!(matches!(result, Err(ScraperError::NotFound)));
        assert_eq!(scraper.fetcher.probe_count(), 15);
    }

    #[tokio::test]
    async fn test_undated_articles_are_not_probed() {
        let html = listing_html(&[
            ("about-this-site", "このサイトについての説明"),
            ("24100101-a", "十月一日のニュースです"),
        ]);
        let fetcher = FakeFetcher::new()
            .with_page(LISTING_URL, html)
            .with_existing(image_url("24100101-a", 2));
        let scraper = scraper(fetcher);

        let illustrations = scraper.discover_illustrations().await.unwrap();

        assert_eq!(illustrations.len(), 1);
        assert_eq!(illustrations[0].index, 2);
        assert_eq!(scraper.fetcher.probe_count(), 3);
        assert!(
            scraper
                .fetcher
                .probed_urls()
                .iter()
                .all(|url| !url.contains("about-this-site"))
        );
    }

    #[test]
    fn test_with_fetcher_rejects_invalid_limits() {
        let result = WebScraper::with_fetcher(
            FakeFetcher::new(),
            SiteConfig::default(),
            DiscoveryLimits {
                max_articles: 0,
                ..Default::default()
            },
        );

        assert!(matches!(result, Err(ScraperError::InvalidLimits(_))));
    }
}
