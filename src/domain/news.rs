//! News items and prompt formatting

use serde::{Deserialize, Serialize};

/// Fixed sentence used when no news could be collected
pub const NO_NEWS_MESSAGE: &str = "No recent news available.";

/// Maximum description prefix included per article in the prompt
const DESCRIPTION_PREVIEW_CHARS: usize = 200;

/// A single collected news article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub description: String,
    pub url: String,
    pub published_at: String,
    pub source: String,
}

/// Format collected news into a single prompt-ready text block
///
/// An empty sequence yields [`NO_NEWS_MESSAGE`], never an empty string, so
/// the generated prompt always states the news situation explicitly.
pub fn format_news_for_prompt(news: &[NewsItem]) -> String {
    if news.is_empty() {
        return NO_NEWS_MESSAGE.to_string();
    }

    let mut formatted = String::from("Recent cryptocurrency news:\n\n");

    for (i, item) in news.iter().enumerate() {
        formatted.push_str(&format!("{}. {}\n", i + 1, item.title));
        if !item.description.is_empty() {
            let preview: String = item.description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
            formatted.push_str(&format!("   {}...\n", preview));
        }
        formatted.push_str(&format!("   Source: {}\n", item.source));
        formatted.push_str(&format!("   Published: {}\n\n", item.published_at));
    }

    formatted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item(title: &str, description: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            description: description.to_string(),
            url: "https://example.com/article".to_string(),
            published_at: "2025-01-01T00:00:00Z".to_string(),
            source: "Example Feed".to_string(),
        }
    }

    #[test]
    fn test_empty_news_yields_fixed_sentence() {
        let formatted = format_news_for_prompt(&[]);
        assert_eq!(formatted, NO_NEWS_MESSAGE);
    }

    #[test]
    fn test_formatting_numbers_entries() {
        let news = vec![
            sample_item("Bitcoin rallies", "Price jumped overnight"),
            sample_item("Ethereum upgrade", "New fork scheduled"),
        ];
        let formatted = format_news_for_prompt(&news);
        assert!(formatted.starts_with("Recent cryptocurrency news:"));
        assert!(formatted.contains("1. Bitcoin rallies"));
        assert!(formatted.contains("2. Ethereum upgrade"));
        assert!(formatted.contains("Source: Example Feed"));
    }

    #[test]
    fn test_long_description_is_truncated() {
        let long = "x".repeat(500);
        let news = vec![sample_item("Headline", &long)];
        let formatted = format_news_for_prompt(&news);
        assert!(formatted.contains(&format!("{}...", "x".repeat(200))));
        assert!(!formatted.contains(&"x".repeat(201)));
    }

    #[test]
    fn test_empty_description_is_skipped() {
        let news = vec![sample_item("Headline only", "")];
        let formatted = format_news_for_prompt(&news);
        assert!(formatted.contains("1. Headline only"));
        assert!(!formatted.contains("..."));
    }
}
