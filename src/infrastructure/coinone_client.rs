//! Coinone REST API client
//!
//! Public endpoints (ticker, orderbook) need no authentication; private
//! endpoints (balance, orders) go through the signing recipe in
//! [`super::signing`]. Every call follows the degrade-to-empty policy: a
//! transport or HTTP failure is logged and becomes
//! [`MarketData::Unavailable`], never an error raised to the caller, so the
//! dashboard survives a flaky network. The client never retries.

use crate::domain::market::{MarketData, OrderSide};
use crate::infrastructure::signing::sign_payload;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{error, warn};

/// Bounded timeout for all exchange calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Latest price snapshot for one currency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticker {
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub first: String,
    #[serde(default)]
    pub last: String,
    #[serde(default)]
    pub high: String,
    #[serde(default)]
    pub low: String,
    #[serde(default)]
    pub volume: String,
    #[serde(default)]
    pub yesterday_last: String,
}

impl Ticker {
    /// Latest price as a number; the exchange reports prices as strings
    pub fn last_price(&self) -> Option<f64> {
        self.last.parse().ok()
    }

    /// Fractional change versus yesterday's close, when both sides parse
    pub fn change_rate(&self) -> Option<f64> {
        let last: f64 = self.last.parse().ok()?;
        let yesterday: f64 = self.yesterday_last.parse().ok()?;
        if yesterday == 0.0 {
            return None;
        }
        Some((last - yesterday) / yesterday)
    }
}

/// One price level in the orderbook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderbookEntry {
    pub price: String,
    pub qty: String,
}

/// Orderbook snapshot for one currency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Orderbook {
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub bid: Vec<OrderbookEntry>,
    #[serde(default)]
    pub ask: Vec<OrderbookEntry>,
}

/// Coinone API client holding the static credential pair
pub struct CoinoneClient {
    client: Client,
    api_base: String,
    access_token: String,
    secret_key: String,
}

impl CoinoneClient {
    pub fn new(api_base: &str, access_token: &str, secret_key: &str) -> Self {
        if access_token.is_empty() || secret_key.is_empty() {
            warn!("Coinone credentials are not configured; private API calls will fail");
        }

        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            secret_key: secret_key.to_string(),
        }
    }

    /// Current time in milliseconds, used once per private request
    fn current_nonce() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    /// Fetch the latest price snapshot for a currency
    pub async fn get_ticker(&self, currency: &str) -> MarketData<Ticker> {
        let url = format!("{}/ticker", self.api_base);

        let response = match self
            .client
            .get(&url)
            .query(&[("currency", currency)])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Ticker request failed for {}: {}", currency, e);
                return MarketData::Unavailable;
            }
        };

        if !response.status().is_success() {
            error!(
                "Ticker request for {} returned HTTP {}",
                currency,
                response.status()
            );
            return MarketData::Unavailable;
        }

        match response.json::<Ticker>().await {
            Ok(ticker) => MarketData::Available(ticker),
            Err(e) => {
                error!("Failed to parse ticker response for {}: {}", currency, e);
                MarketData::Unavailable
            }
        }
    }

    /// Fetch the orderbook for a currency
    pub async fn get_orderbook(&self, currency: &str) -> MarketData<Orderbook> {
        let url = format!("{}/orderbook", self.api_base);

        let response = match self
            .client
            .get(&url)
            .query(&[("currency", currency)])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Orderbook request failed for {}: {}", currency, e);
                return MarketData::Unavailable;
            }
        };

        if !response.status().is_success() {
            error!(
                "Orderbook request for {} returned HTTP {}",
                currency,
                response.status()
            );
            return MarketData::Unavailable;
        }

        match response.json::<Orderbook>().await {
            Ok(orderbook) => MarketData::Available(orderbook),
            Err(e) => {
                error!("Failed to parse orderbook response for {}: {}", currency, e);
                MarketData::Unavailable
            }
        }
    }

    /// Fetch account balances (authenticated)
    pub async fn get_balance(&self) -> MarketData<Value> {
        self.private_post("/v2/account/balance", Map::new()).await
    }

    /// Place a limit order (authenticated)
    ///
    /// Prices on the KRW market are integral won amounts.
    pub async fn place_order(
        &self,
        price: u64,
        qty: f64,
        currency: &str,
        side: OrderSide,
    ) -> MarketData<Value> {
        let mut fields = Map::new();
        fields.insert("price".to_string(), json!(price));
        fields.insert("qty".to_string(), json!(qty));
        fields.insert("currency".to_string(), json!(currency));

        let path = format!("/v2/order/{}", side.api_path());
        self.private_post(&path, fields).await
    }

    /// Fetch open limit orders for a currency (authenticated)
    pub async fn get_orders(&self, currency: &str) -> MarketData<Value> {
        let mut fields = Map::new();
        fields.insert("currency".to_string(), json!(currency));

        self.private_post("/v2/order/limit_orders", fields).await
    }

    /// Send one signed POST to a private endpoint
    ///
    /// An application-level error body (`result == "error"`) is logged with
    /// the exchange's code and message but still returned to the caller; it
    /// is a valid response, not a transport failure.
    async fn private_post(&self, path: &str, fields: Map<String, Value>) -> MarketData<Value> {
        let url = format!("{}{}", self.api_base, path);

        let signed = match sign_payload(
            &self.secret_key,
            &self.access_token,
            Self::current_nonce(),
            &fields,
        ) {
            Ok(signed) => signed,
            Err(e) => {
                error!("Failed to sign request for {}: {}", path, e);
                return MarketData::Unavailable;
            }
        };

        let response = match self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("X-COINONE-PAYLOAD", &signed.payload)
            .header("X-COINONE-SIGNATURE", &signed.signature)
            .body(signed.payload.clone())
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Private request to {} failed: {}", path, e);
                return MarketData::Unavailable;
            }
        };

        if !response.status().is_success() {
            error!("Private request to {} returned HTTP {}", path, response.status());
            return MarketData::Unavailable;
        }

        let value = match response.json::<Value>().await {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to parse response from {}: {}", path, e);
                return MarketData::Unavailable;
            }
        };

        if value.get("result").and_then(Value::as_str) == Some("error") {
            let code = value.get("errorCode").and_then(Value::as_str).unwrap_or("");
            let msg = value.get("errorMsg").and_then(Value::as_str).unwrap_or("");
            warn!("Coinone API error on {}: {} - {}", path, code, msg);
        }

        MarketData::Available(value)
    }
}
