//! Paginated download of historical news.

use anyhow::Result;
use tracing::{debug, info};

use super::client::NewsSource;
use super::types::{DateRange, RawArticle};
use crate::TARGET_WEB_REQUEST;

/// Download every page of news in the date range, in the order returned by
/// the API (ascending publication time). Pagination continues while the API
/// returns a next-page token and stops as soon as it is absent.
pub async fn download_historical_news(
    source: &impl NewsSource,
    range: DateRange,
) -> Result<Vec<RawArticle>> {
    info!(target: TARGET_WEB_REQUEST, "Downloading news from {} to {}", range.from, range.to);

    let mut articles: Vec<RawArticle> = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = source.fetch_page(range, page_token.as_deref()).await?;
        articles.extend(page.articles);

        match page.next_page_token {
            Some(token) => {
                if let Some(last) = articles.last() {
                    debug!(target: TARGET_WEB_REQUEST,
                           "Downloaded {} articles so far, last date {}", articles.len(), last.date);
                }
                page_token = Some(token);
            }
            None => break,
        }
    }

    info!(target: TARGET_WEB_REQUEST,
          "Downloaded {} articles between {} and {}", articles.len(), range.from, range.to);

    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::types::NewsPage;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn article(headline: &str) -> RawArticle {
        RawArticle {
            headline: headline.to_string(),
            summary: String::new(),
            content: String::new(),
            date: Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
        }
    }

    fn range() -> DateRange {
        DateRange {
            from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
        }
    }

    /// Returns a token on the first call and none on the second.
    struct TwoPageSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl NewsSource for TwoPageSource {
        async fn fetch_page(
            &self,
            _range: DateRange,
            page_token: Option<&str>,
        ) -> anyhow::Result<NewsPage> {
            match self.calls.fetch_add(1, Ordering::SeqCst) {
                0 => {
                    assert!(page_token.is_none());
                    Ok(NewsPage {
                        articles: vec![article("first"), article("second")],
                        next_page_token: Some("cursor".to_string()),
                    })
                }
                1 => {
                    assert_eq!(page_token, Some("cursor"));
                    Ok(NewsPage {
                        articles: vec![article("third")],
                        next_page_token: None,
                    })
                }
                _ => panic!("fetch_page called more than twice"),
            }
        }
    }

    #[tokio::test]
    async fn pagination_terminates_when_token_absent() {
        let source = TwoPageSource {
            calls: AtomicUsize::new(0),
        };

        let articles = download_historical_news(&source, range()).await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        let headlines: Vec<&str> = articles.iter().map(|a| a.headline.as_str()).collect();
        assert_eq!(headlines, vec!["first", "second", "third"]);
    }

    /// A single page with no token issues exactly one request.
    struct SinglePageSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl NewsSource for SinglePageSource {
        async fn fetch_page(
            &self,
            _range: DateRange,
            _page_token: Option<&str>,
        ) -> anyhow::Result<NewsPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(NewsPage {
                articles: vec![article("only")],
                next_page_token: None,
            })
        }
    }

    #[tokio::test]
    async fn single_page_issues_one_request() {
        let source = SinglePageSource {
            calls: AtomicUsize::new(0),
        };

        let articles = download_historical_news(&source, range()).await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(articles.len(), 1);
    }
}
