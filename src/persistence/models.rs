//! Database Models
//!
//! Persistent row structures for trades, portfolio positions, and analysis
//! records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Trade record in database; rows are never mutated after insert
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TradeRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub currency: String,
    pub action: String, // "buy" or "sell"
    pub price: f64,
    pub quantity: f64,
    /// price * quantity at insert time, stored redundantly for audit
    pub total_amount: f64,
    pub order_id: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Portfolio position derived from the trade history, one row per asset
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PositionRecord {
    pub id: i64,
    pub currency: String,
    pub quantity: f64,
    /// Weighted average acquisition cost; recomputed only on buys
    pub avg_price: f64,
    pub updated_at: DateTime<Utc>,
}

/// Analysis record in database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalysisRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub currency: String,
    pub analysis_type: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Create trade input
#[derive(Debug, Clone)]
pub struct NewTrade {
    pub currency: String,
    pub action: String,
    pub price: f64,
    pub quantity: f64,
    pub order_id: Option<String>,
    pub status: String,
    pub notes: Option<String>,
}

impl NewTrade {
    /// Convenience constructor for a manually entered trade intent
    pub fn new(currency: &str, action: &str, price: f64, quantity: f64) -> Self {
        Self {
            currency: currency.to_string(),
            action: action.to_string(),
            price,
            quantity,
            order_id: None,
            status: "pending".to_string(),
            notes: None,
        }
    }
}
