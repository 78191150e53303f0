use tracing::warn;

/// Application configuration with environment overrides
///
/// Every field has a default suitable for local development; set the
/// corresponding environment variable (or a `.env` entry) to override.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Coinone access token for private API calls
    pub access_token: String,
    /// Coinone secret key used to sign private API payloads
    pub secret_key: String,
    /// Coinone REST API base URL
    pub api_base: String,
    /// SQLite database URL (e.g., "sqlite://data/trading.db")
    pub database_url: String,
    /// OpenAI-compatible generation endpoint base URL
    pub llm_api_url: String,
    /// Model name passed to the generation endpoint
    pub llm_model_name: String,
    /// News API key (empty disables the News API path)
    pub news_api_key: String,
    /// RSS feed URLs for crypto news
    pub rss_feed_urls: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            access_token: String::new(),
            secret_key: String::new(),
            api_base: "https://api.coinone.co.kr".to_string(),
            database_url: "sqlite://data/trading.db".to_string(),
            llm_api_url: "http://localhost:1234/v1".to_string(),
            llm_model_name: "local-model".to_string(),
            news_api_key: String::new(),
            rss_feed_urls: vec!["https://www.coindesk.com/arc/outboundfeeds/rss/".to_string()],
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppConfig {
        let mut config = AppConfig::default();

        if let Ok(token) = std::env::var("COINONE_ACCESS_TOKEN") {
            config.access_token = token;
        }

        if let Ok(secret) = std::env::var("COINONE_SECRET_KEY") {
            config.secret_key = secret;
        }

        if let Ok(base) = std::env::var("COINONE_API_BASE") {
            if base.starts_with("http") {
                config.api_base = base;
            } else {
                warn!(
                    "Invalid COINONE_API_BASE value: {}, using default: {}",
                    base, config.api_base
                );
            }
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }

        if let Ok(url) = std::env::var("LM_STUDIO_API_URL") {
            config.llm_api_url = url;
        }

        if let Ok(model) = std::env::var("LM_STUDIO_MODEL_NAME") {
            if !model.is_empty() {
                config.llm_model_name = model;
            }
        }

        if let Ok(key) = std::env::var("NEWS_API_KEY") {
            config.news_api_key = key;
        }

        if let Ok(urls) = std::env::var("RSS_FEED_URLS") {
            let parsed: Vec<String> = urls
                .split(',')
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
                .collect();
            if !parsed.is_empty() {
                config.rss_feed_urls = parsed;
            }
        }

        if config.access_token.is_empty() || config.secret_key.is_empty() {
            warn!("Coinone access token or secret key is not configured; private API calls will fail");
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api_base, "https://api.coinone.co.kr");
        assert_eq!(config.database_url, "sqlite://data/trading.db");
        assert_eq!(config.llm_api_url, "http://localhost:1234/v1");
        assert_eq!(config.llm_model_name, "local-model");
        assert!(config.access_token.is_empty());
        assert_eq!(config.rss_feed_urls.len(), 1);
    }
}
