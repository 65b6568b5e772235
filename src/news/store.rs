//! Persistence of raw news batches as JSON files.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use super::types::RawArticle;

/// Path of the saved batch for a date range, keyed by the from/to dates.
pub fn news_file_path(dir: &Path, from: &str, to: &str) -> PathBuf {
    dir.join(format!("news_{}_{}.json", from, to))
}

/// Save articles to a JSON file named after the first and last article dates.
/// Returns the path written.
pub fn save_news_to_json(articles: &[RawArticle], dir: &Path) -> Result<PathBuf> {
    let (first, last) = match (articles.first(), articles.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => anyhow::bail!("No articles to save"),
    };

    let from = first.date.format("%Y-%m-%d").to_string();
    let to = last.date.format("%Y-%m-%d").to_string();
    let path = news_file_path(dir, &from, &to);

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
    let json = serde_json::to_string_pretty(articles)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Saved {} articles to {}", articles.len(), path.display());

    Ok(path)
}

/// Load a previously saved batch. A missing file is an error the caller
/// treats as fatal.
pub fn load_news(dir: &Path, from: &str, to: &str) -> Result<Vec<RawArticle>> {
    let path = news_file_path(dir, from, to);
    if !path.is_file() {
        error!("News file {} not found", path.display());
        anyhow::bail!("News file {} not found", path.display());
    }

    let json = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let articles: Vec<RawArticle> = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    info!("Loaded {} articles from {}", articles.len(), path.display());

    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn article(day: u32, headline: &str) -> RawArticle {
        RawArticle {
            headline: headline.to_string(),
            summary: "s".to_string(),
            content: "c".to_string(),
            date: Utc.with_ymd_and_hms(2024, 1, day, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let articles = vec![article(1, "a"), article(9, "b")];

        let path = save_news_to_json(&articles, dir.path()).unwrap();
        assert!(path.ends_with("news_2024-01-01_2024-01-09.json"));

        let loaded = load_news(dir.path(), "2024-01-01", "2024-01-09").unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].headline, "a");
        assert_eq!(loaded[1].date, articles[1].date);
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_news(dir.path(), "2024-01-01", "2024-01-09").is_err());
    }

    #[test]
    fn save_empty_batch_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(save_news_to_json(&[], dir.path()).is_err());
    }
}
