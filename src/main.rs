//! One-shot console dashboard: market snapshot, news, portfolio, recent
//! trades, and an optional model-generated analysis when the generation
//! endpoint is reachable.

use coinvest::config::AppConfig;
use coinvest::domain::analysis::{build_analysis_prompt, AI_ANALYSIS_TYPE};
use coinvest::domain::market::MarketData;
use coinvest::domain::news::format_news_for_prompt;
use coinvest::infrastructure::coinone_client::CoinoneClient;
use coinvest::infrastructure::llm_client::LlmClient;
use coinvest::infrastructure::news_fetcher::{NewsFetcher, NewsMethod};
use coinvest::persistence::init_database;
use coinvest::persistence::ledger::LedgerStore;
use std::collections::HashMap;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DASHBOARD_CURRENCIES: [&str; 3] = ["BTC", "ETH", "XRP"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coinvest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Coin investment dashboard starting...");

    let config = AppConfig::from_env();
    let pool = init_database(&config.database_url).await?;
    let ledger = LedgerStore::new(pool);
    let api = CoinoneClient::new(&config.api_base, &config.access_token, &config.secret_key);
    let news_fetcher = NewsFetcher::new(&config.news_api_key, config.rss_feed_urls.clone());
    let llm = LlmClient::new(&config.llm_api_url, &config.llm_model_name);

    let mut last_prices: HashMap<&str, f64> = HashMap::new();

    println!("=== Market ===");
    for currency in DASHBOARD_CURRENCIES {
        match api.get_ticker(currency).await {
            MarketData::Available(ticker) => {
                if let Some(price) = ticker.last_price() {
                    last_prices.insert(currency, price);
                }
                let change = ticker
                    .change_rate()
                    .map(|rate| format!("{:+.2}%", rate * 100.0))
                    .unwrap_or_else(|| "n/a".to_string());
                println!("{:<4} {:>16} KRW  {}", currency, ticker.last, change);
            }
            MarketData::Unavailable => {
                println!("{:<4} unavailable", currency);
            }
        }
    }

    let news = news_fetcher.get_crypto_news(NewsMethod::Rss, 5).await;
    println!("\n=== News ===");
    if news.is_empty() {
        println!("No news collected.");
    }
    for item in &news {
        println!("- {} ({})", item.title, item.source);
    }

    println!("\n=== Portfolio ===");
    let positions = ledger.get_positions().await?;
    if positions.is_empty() {
        println!("No holdings.");
    }
    for position in &positions {
        println!(
            "{:<4} qty {:.8}  avg {:.0} KRW",
            position.currency, position.quantity, position.avg_price
        );
    }

    println!("\n=== Recent trades ===");
    let trades = ledger.list_trades(None, 10).await?;
    if trades.is_empty() {
        println!("No trades recorded.");
    }
    for trade in &trades {
        println!(
            "#{:<4} {} {:>4} {:.8} {} @ {:.0} ({})",
            trade.id,
            trade.timestamp.format("%Y-%m-%d %H:%M"),
            trade.action,
            trade.quantity,
            trade.currency,
            trade.price,
            trade.status
        );
    }

    match llm.check_connection().await {
        Ok(_) => {
            let currency = "BTC";
            let news_text = format_news_for_prompt(&news);
            let prompt =
                build_analysis_prompt(currency, last_prices.get(currency).copied(), &news_text);

            match llm.generate(&prompt, 1024, 0.7).await {
                Ok(text) => {
                    println!("\n=== AI analysis ({}) ===\n{}", currency, text);
                    ledger.record_analysis(currency, AI_ANALYSIS_TYPE, &text).await?;
                    info!("Analysis saved for {}", currency);
                }
                Err(e) => {
                    eprintln!("\nAI analysis failed: {}", e);
                }
            }
        }
        Err(e) => {
            warn!("Generation endpoint not reachable, skipping analysis: {}", e);
        }
    }

    Ok(())
}
