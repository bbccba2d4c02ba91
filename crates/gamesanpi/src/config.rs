//! Site locations and discovery bounds.
//!
//! The listing page, article pages and illustration assets do not share one
//! origin on the production site: the listing and images are served from
//! `www.gamesanpi.com` while canonical article links drop the `www`.

pub const LISTING_URL: &str = "https://www.gamesanpi.com/";
pub const ARTICLE_BASE_URL: &str = "https://gamesanpi.com";
pub const IMAGE_BASE_URL: &str = "https://www.gamesanpi.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Page scanned for article links.
    pub listing_url: String,
    /// Origin prefixed to `/news/<slug>` when building canonical article URLs.
    pub article_base_url: String,
    /// Origin prefixed to `/images/articles/...` when building illustration URLs.
    pub image_base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            listing_url: LISTING_URL.to_string(),
            article_base_url: ARTICLE_BASE_URL.to_string(),
            image_base_url: IMAGE_BASE_URL.to_string(),
        }
    }
}

impl SiteConfig {
    /// Serve everything from a single origin, e.g. a mirror or a local test server.
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            listing_url: format!("{}/", base),
            article_base_url: base.clone(),
            image_base_url: base,
        }
    }

    pub fn article_url(&self, slug: &str) -> String {
        format!(
            "{}/news/{}",
            self.article_base_url.trim_end_matches('/'),
            slug
        )
    }

    pub fn illustration_url(&self, year: &str, month: &str, slug: &str, index: u8) -> String {
        format!(
            "{}/images/articles/{}/{}/{}/illust{}.png",
            self.image_base_url.trim_end_matches('/'),
            year,
            month,
            slug,
            index
        )
    }

    /// Accepts both the site-relative and the absolute form of an article link
    /// and returns the slug part of it.
    pub(crate) fn slug_from_href<'a>(&self, href: &'a str) -> Option<&'a str> {
        if let Some(slug) = href.strip_prefix("/news/") {
            return Some(slug);
        }
        [&self.article_base_url, &self.listing_url, &self.image_base_url]
            .into_iter()
            .find_map(|origin| {
                href.strip_prefix(origin.trim_end_matches('/'))?
                    .strip_prefix("/news/")
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryLimits {
    /// Articles considered for probing, counted from the newest.
    pub max_articles: usize,
    /// Highest `illust<N>.png` index probed per article.
    pub illustrations_per_article: u8,
    /// Probing stops as soon as this many illustrations were found.
    pub max_illustrations: usize,
    /// Probes allowed in flight at once. `1` probes strictly one after another.
    pub concurrency: usize,
}

impl Default for DiscoveryLimits {
    fn default() -> Self {
        Self {
            max_articles: 15,
            illustrations_per_article: 3,
            max_illustrations: 10,
            concurrency: 1,
        }
    }
}

impl DiscoveryLimits {
    pub fn validate(self) -> Result<Self, String> {
        if self.max_articles == 0 {
            return Err("max_articles must be greater than 0".to_string());
        }
        if self.illustrations_per_article == 0 {
            return Err("illustrations_per_article must be greater than 0".to_string());
        }
        if self.max_illustrations == 0 {
            return Err("max_illustrations must be greater than 0".to_string());
        }
        if self.concurrency == 0 {
            return Err("concurrency must be greater than 0".to_string());
        }
        Ok(self)
    }
}
