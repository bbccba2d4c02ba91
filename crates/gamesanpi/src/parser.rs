use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::config::SiteConfig;
use crate::types::Article;

static RE_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]+$").expect("invalid regex: slug"));

static RE_SLUG_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{2})([0-9]{2})([0-9]{2})([0-9]{2})").expect("invalid regex: slug date")
});

static SEL_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("invalid selector: link"));

static SEL_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3").expect("invalid selector: heading"));

/// Sidebar and header labels that are rendered with the same card markup as articles.
const NAVIGATION_LABELS: [&str; 4] = ["カテゴリー", "人気記事", "ゲーム賛否", "人気タグ"];

const NAVIGATION_FRAGMENTS: [&str; 4] = ["span", "記事", "タグ", "カテゴリ"];

const MIN_TITLE_CHARS: usize = 6;

/// Date prefix of an article slug: `YYMMDDNN` where `NN` numbers the articles of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlugDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub sequence: u8,
}

impl SlugDate {
    pub fn parse(slug: &str) -> Option<SlugDate> {
        let caps = RE_SLUG_DATE.captures(slug)?;
        Some(SlugDate {
            year: 2000 + caps[1].parse::<u16>().ok()?,
            month: caps[2].parse().ok()?,
            day: caps[3].parse().ok()?,
            sequence: caps[4].parse().ok()?,
        })
    }

    pub fn sort_key(&self) -> String {
        format!(
            "{:04}{:02}{:02}{:02}",
            self.year, self.month, self.day, self.sequence
        )
    }

    pub fn year_segment(&self) -> String {
        format!("{:04}", self.year)
    }

    pub fn month_segment(&self) -> String {
        format!("{:02}", self.month)
    }

    pub fn published_label(&self) -> String {
        format!("{:04}年{:02}月{:02}日", self.year, self.month, self.day)
    }

    /// `None` when the prefix is not a real calendar date (e.g. month `13`).
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year.into(), self.month.into(), self.day.into())
    }
}

/// Serialized markup of the heading. Entities stay escaped, so the title is
/// decoded exactly once by [`decode_entities`].
fn heading_markup(heading: ElementRef) -> String {
    heading.inner_html()
}

/// Resolves the entities found in listing titles, in this order. Each entity
/// is replaced once, so `&amp;amp;` becomes `&amp;`.
pub fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&#x27;", "'")
        .replace("&#x2F;", "/")
}

pub fn is_article_title(title: &str) -> bool {
    title.chars().count() >= MIN_TITLE_CHARS
        && !NAVIGATION_LABELS.contains(&title)
        && !NAVIGATION_FRAGMENTS
            .iter()
            .any(|fragment| title.contains(fragment))
}

/// Extracts the article cards of the listing page, newest first.
///
/// A card is a link to `/news/<slug>` wrapping an `h3` title. Links are
/// deduplicated on their canonical URL before titles are filtered, so a
/// rejected first occurrence still hides later copies of the same link.
pub fn parse_article_list(html: &str, site: &SiteConfig) -> Vec<Article> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut articles = Vec::new();

    for link in document.select(&SEL_LINK) {
        let Some(slug) = link
            .value()
            .attr("href")
            .and_then(|href| site.slug_from_href(href))
            .filter(|slug| RE_SLUG.is_match(slug))
        else {
            continue;
        };

        let Some(heading) = link.select(&SEL_HEADING).next() else {
            continue;
        };

        let title = decode_entities(&heading_markup(heading)).trim().to_string();
        let url = site.article_url(slug);

        if !seen.insert(url.clone()) {
            continue;
        }

        if !is_article_title(&title) {
            log::debug!("Skipping non-article card '{}' ({})", title, url);
            continue;
        }

        let date = SlugDate::parse(slug);
        if date.is_none() {
            log::warn!("Article slug without date prefix: {}", slug);
        }

        articles.push(Article {
            url,
            title,
            slug: slug.to_string(),
            sort_key: date.map(|d| d.sort_key()).unwrap_or_default(),
            published_on: date.and_then(|d| d.date()),
        });
    }

    articles.sort_by(|a, b| b.sort_key.cmp(&a.sort_key));
    articles
}
