use std::fmt::Display;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub slug: String,
    /// `YYYYMMDDNN` taken from the slug, empty when the slug carries no date.
    pub sort_key: String,
    pub published_on: Option<NaiveDate>,
}

impl Display for Article {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.published_on {
            Some(date) => write!(f, "[{}] {}", date, self.title),
            None => write!(f, "[----------] {}", self.title),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Illustration {
    pub image_url: String,
    pub article_url: String,
    pub article_title: String,
    /// `YYYY年MM月DD日`
    pub published_date: String,
    /// Position of the image within its article, starting at 1.
    pub index: u8,
    /// Article sort key, an underscore, then the index.
    pub sort_key: String,
}

impl Display for Illustration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} #{} - {}",
            self.published_date, self.index, self.article_title
        )?;
        writeln!(f, "     image:   {}", self.image_url)?;
        write!(f, "     article: {}", self.article_url)
    }
}
