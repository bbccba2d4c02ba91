use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::types::{Article, Illustration};

#[derive(Debug, Default, Clone, Deserialize, JsonSchema)]
pub struct ListingFilter {
    /// Keep articles published on or after this date (YYYY-MM-DD).
    pub since: Option<NaiveDate>,
    /// Keep articles published on or before this date (YYYY-MM-DD).
    pub until: Option<NaiveDate>,
    /// Maximum number of articles to return.
    pub limit: Option<usize>,
    /// Number of articles to skip from the newest.
    pub offset: Option<usize>,
}

impl ListingFilter {
    /// Undated articles never satisfy a date bound.
    pub fn apply(self, mut articles: Vec<Article>) -> Vec<Article> {
        if let Some(since) = self.since {
            articles.retain(|a| a.published_on.is_some_and(|d| d >= since));
        }
        if let Some(until) = self.until {
            articles.retain(|a| a.published_on.is_some_and(|d| d <= until));
        }
        if let Some(off) = self.offset {
            articles = articles.into_iter().skip(off).collect();
        }
        if let Some(lim) = self.limit {
            articles.truncate(lim);
        }
        articles
    }

    pub fn validate(self) -> Result<Self, String> {
        if let Some(since) = self.since
            && let Some(until) = self.until
            && since > until
        {
            return Err(format!(
                "Since date ({since}) cannot be after until date ({until})"
            ));
        }
        if self.offset.is_some_and(|o| o == 0) {
            return Err("Offset must be greater than 0".to_string());
        }
        if self.limit.is_some_and(|l| l == 0) {
            return Err("Limit must be greater than 0".to_string());
        }
        Ok(self)
    }
}

#[derive(Debug)]
pub struct ListingStats {
    pub dated: usize,
    pub undated: usize,
    pub total: usize,
}

impl ListingStats {
    pub fn from_articles(articles: &[Article]) -> ListingStats {
        let dated = articles.iter().filter(|a| !a.sort_key.is_empty()).count();
        ListingStats {
            dated,
            undated: articles.len() - dated,
            total: articles.len(),
        }
    }
}

impl std::fmt::Display for ListingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nStatistics:")?;
        writeln!(f, "  Dated articles:   {}", self.dated)?;
        writeln!(f, "  Undated articles: {}", self.undated)?;
        writeln!(f, "  Total:            {}", self.total)
    }
}

#[derive(Debug)]
pub struct IllustrationStats {
    /// Illustrations found per `illust<N>.png` index.
    pub by_index: BTreeMap<u8, usize>,
    pub articles: usize,
    pub total: usize,
}

impl IllustrationStats {
    pub fn from_illustrations(illustrations: &[Illustration]) -> IllustrationStats {
        let mut by_index = BTreeMap::new();
        for illustration in illustrations {
            *by_index.entry(illustration.index).or_insert(0) += 1;
        }
        IllustrationStats {
            by_index,
            articles: illustrations
                .iter()
                .map(|i| i.article_url.as_str())
                .collect::<HashSet<_>>()
                .len(),
            total: illustrations.len(),
        }
    }
}

impl std::fmt::Display for IllustrationStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nStatistics:")?;
        for (index, count) in &self.by_index {
            writeln!(f, "  illust{}.png:  {}", index, count)?;
        }
        writeln!(f, "  Articles:      {}", self.articles)?;
        writeln!(f, "  Total:         {}", self.total)
    }
}
