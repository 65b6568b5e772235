//! Type definitions for the news module.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Duration;

pub const NEWS_API_URL: &str = "https://data.alpaca.markets/v1beta1/news";
pub const PAGE_LIMIT: u32 = 50;
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A single raw article as returned by the news API. Immutable once fetched;
/// `content` may contain HTML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawArticle {
    pub headline: String,
    pub summary: String,
    pub content: String,
    pub date: DateTime<Utc>,
}

/// Inclusive day-level date range for a news download.
#[derive(Debug, Clone, Copy)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// One page of API results plus the cursor for the next page.
#[derive(Debug, Clone)]
pub struct NewsPage {
    pub articles: Vec<RawArticle>,
    pub next_page_token: Option<String>,
}

/// Wire format of the news endpoint response.
#[derive(Debug, Deserialize)]
pub(crate) struct NewsResponse {
    #[serde(default)]
    pub news: Vec<ApiArticle>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiArticle {
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

impl From<ApiArticle> for RawArticle {
    fn from(article: ApiArticle) -> Self {
        Self {
            headline: article.headline,
            summary: article.summary,
            content: article.content,
            date: article.updated_at,
        }
    }
}
