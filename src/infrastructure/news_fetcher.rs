//! Crypto news collection from the News API and RSS feeds
//!
//! Both paths degrade to an empty list on failure; a dashboard without news
//! is preferable to one that crashes on a dead feed.

use crate::domain::news::NewsItem;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info, warn};

const NEWS_API_URL: &str = "https://newsapi.org/v2/everything";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Which collection path to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsMethod {
    Rss,
    Api,
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: String,
    #[serde(rename = "publishedAt", default)]
    published_at: String,
    #[serde(default)]
    source: NewsApiSource,
}

#[derive(Debug, Default, Deserialize)]
struct NewsApiSource {
    #[serde(default)]
    name: String,
}

impl From<NewsApiArticle> for NewsItem {
    fn from(article: NewsApiArticle) -> Self {
        NewsItem {
            title: article.title,
            description: article.description.unwrap_or_default(),
            url: article.url,
            published_at: article.published_at,
            source: article.source.name,
        }
    }
}

/// News collector over the configured sources
pub struct NewsFetcher {
    client: Client,
    api_key: String,
    rss_urls: Vec<String>,
}

impl NewsFetcher {
    pub fn new(api_key: &str, rss_urls: Vec<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            rss_urls,
        }
    }

    /// Collect crypto news with the given method
    pub async fn get_crypto_news(&self, method: NewsMethod, max_results: usize) -> Vec<NewsItem> {
        match method {
            NewsMethod::Api => {
                self.fetch_news_api("cryptocurrency OR bitcoin OR ethereum", "en", max_results)
                    .await
            }
            NewsMethod::Rss => self.fetch_rss_feeds(max_results).await,
        }
    }

    /// Fetch news from the News API
    pub async fn fetch_news_api(
        &self,
        query: &str,
        language: &str,
        max_results: usize,
    ) -> Vec<NewsItem> {
        if self.api_key.is_empty() {
            warn!("News API key is not configured");
            return Vec::new();
        }

        let response = match self
            .client
            .get(NEWS_API_URL)
            .query(&[
                ("q", query),
                ("language", language),
                ("sortBy", "publishedAt"),
                ("pageSize", &max_results.to_string()),
                ("apiKey", &self.api_key),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("News API request failed: {}", e);
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            error!("News API returned HTTP {}", response.status());
            return Vec::new();
        }

        match response.json::<NewsApiResponse>().await {
            Ok(parsed) => {
                let news: Vec<NewsItem> = parsed.articles.into_iter().map(NewsItem::from).collect();
                info!("Collected {} articles from the News API", news.len());
                news
            }
            Err(e) => {
                error!("Failed to parse News API response: {}", e);
                Vec::new()
            }
        }
    }

    /// Fetch news from the configured RSS feeds
    ///
    /// Each feed is independent; a failing feed is logged and skipped.
    pub async fn fetch_rss_feeds(&self, max_results: usize) -> Vec<NewsItem> {
        if self.rss_urls.is_empty() {
            warn!("No RSS feed URLs are configured");
            return Vec::new();
        }

        let mut news = Vec::new();

        for rss_url in &self.rss_urls {
            let bytes = match self
                .client
                .get(rss_url)
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await
                .and_then(|r| r.error_for_status())
            {
                Ok(response) => match response.bytes().await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        error!("Failed to read RSS feed {}: {}", rss_url, e);
                        continue;
                    }
                },
                Err(e) => {
                    error!("Failed to fetch RSS feed {}: {}", rss_url, e);
                    continue;
                }
            };

            match feed_rs::parser::parse(bytes.as_ref()) {
                Ok(feed) => {
                    let items = feed_to_items(feed, max_results);
                    info!("Collected {} entries from RSS feed {}", items.len(), rss_url);
                    news.extend(items);
                }
                Err(e) => {
                    error!("Failed to parse RSS feed {}: {}", rss_url, e);
                    continue;
                }
            }
        }

        news
    }
}

/// Convert a parsed feed into news items, bounded per feed
fn feed_to_items(feed: feed_rs::model::Feed, max_results: usize) -> Vec<NewsItem> {
    let source = feed
        .title
        .as_ref()
        .map(|t| t.content.clone())
        .unwrap_or_else(|| "RSS Feed".to_string());

    feed.entries
        .into_iter()
        .take(max_results)
        .map(|entry| NewsItem {
            title: entry.title.map(|t| t.content).unwrap_or_default(),
            description: entry.summary.map(|t| t.content).unwrap_or_default(),
            url: entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default(),
            published_at: entry
                .published
                .map(|d| d.to_rfc3339())
                .unwrap_or_default(),
            source: source.clone(),
        })
        .collect()
}
