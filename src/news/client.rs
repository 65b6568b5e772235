//! HTTP client for the market-news API.

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, error};

use super::types::{
    DateRange, NewsPage, NewsResponse, RawArticle, NEWS_API_URL, PAGE_LIMIT, REQUEST_TIMEOUT,
};
use crate::TARGET_WEB_REQUEST;

/// A paginated source of news articles.
#[async_trait]
pub trait NewsSource {
    /// Fetch one page of articles for the range, starting from `page_token`
    /// (or the beginning when `None`).
    async fn fetch_page(&self, range: DateRange, page_token: Option<&str>) -> Result<NewsPage>;
}

/// Client for the Alpaca market-news endpoint.
pub struct AlpacaNewsClient {
    client: reqwest::Client,
    api_key_id: String,
    api_secret_key: String,
}

impl AlpacaNewsClient {
    pub fn new(api_key_id: String, api_secret_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            api_key_id,
            api_secret_key,
        })
    }
}

#[async_trait]
impl NewsSource for AlpacaNewsClient {
    async fn fetch_page(&self, range: DateRange, page_token: Option<&str>) -> Result<NewsPage> {
        let mut params = vec![
            ("start", range.from.format("%Y-%m-%d").to_string()),
            ("end", range.to.format("%Y-%m-%d").to_string()),
            ("sort", "asc".to_string()),
            ("limit", PAGE_LIMIT.to_string()),
            ("include_content", "true".to_string()),
            ("exclude_contentless", "false".to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("page_token", token.to_string()));
        }

        debug!(target: TARGET_WEB_REQUEST, "Requesting news from {} to {} (token: {:?})",
               range.from, range.to, page_token);

        let response = self
            .client
            .get(NEWS_API_URL)
            .header("APCA-API-KEY-ID", &self.api_key_id)
            .header("APCA-API-SECRET-KEY", &self.api_secret_key)
            .query(&params)
            .send()
            .await?;

        // Any non-success status is fatal to the download; there is no retry.
        if !response.status().is_success() {
            error!(target: TARGET_WEB_REQUEST, "Error: {}", response.status());
            anyhow::bail!("News API request failed with status {}", response.status());
        }

        let body: NewsResponse = response.json().await?;
        let articles: Vec<RawArticle> = body.news.into_iter().map(RawArticle::from).collect();

        debug!(target: TARGET_WEB_REQUEST, "Received {} articles, next_page_token present: {}",
               articles.len(), body.next_page_token.is_some());

        Ok(NewsPage {
            articles,
            next_page_token: body.next_page_token,
        })
    }
}
