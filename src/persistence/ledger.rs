//! Ledger Store
//!
//! Data access layer for the trade ledger, the derived portfolio aggregate,
//! and analysis records. The store is the only writer of the `portfolio`
//! table: every `record_trade` recomputes the affected position inside the
//! same transaction as the trade insert, so a crash can never leave the
//! ledger and the aggregate inconsistent.
//!
//! Unlike the market-data client, storage failures here propagate to the
//! caller; silently losing a trade record is unacceptable.

use super::models::{AnalysisRecord, NewTrade, PositionRecord, TradeRecord};
use super::{DatabaseError, DbPool};
use chrono::{DateTime, Utc};
use tracing::{debug, error};

/// Trade ledger and portfolio store
pub struct LedgerStore {
    pool: DbPool,
}

impl LedgerStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Record a trade intent and update the derived position atomically
    ///
    /// The action string is stored opaquely; validation is the caller's
    /// responsibility. In the aggregate step every non-"buy" action reduces
    /// the position like a sell, and a sell may drive the quantity negative
    /// (oversell is not guarded; a non-positive result removes the row).
    ///
    /// Returns the newly assigned trade identifier.
    pub async fn record_trade(&self, trade: NewTrade) -> Result<i64, DatabaseError> {
        let now = Utc::now();
        let total_amount = trade.price * trade.quantity;

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to begin trade transaction: {}", e);
            DatabaseError::QueryError(format!("Failed to begin transaction: {}", e))
        })?;

        let result = sqlx::query(
            r#"
            INSERT INTO trades (
                timestamp, currency, action, price, quantity, total_amount,
                order_id, status, notes, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?1)
            "#,
        )
        .bind(now)
        .bind(&trade.currency)
        .bind(&trade.action)
        .bind(trade.price)
        .bind(trade.quantity)
        .bind(total_amount)
        .bind(&trade.order_id)
        .bind(&trade.status)
        .bind(&trade.notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to insert trade: {}", e);
            DatabaseError::QueryError(format!("Failed to insert trade: {}", e))
        })?;

        let trade_id = result.last_insert_rowid();

        apply_position_change(
            &mut tx,
            &trade.currency,
            &trade.action,
            trade.quantity,
            trade.price,
            now,
        )
        .await?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit trade transaction: {}", e);
            DatabaseError::QueryError(format!("Failed to commit transaction: {}", e))
        })?;

        debug!(
            "Recorded trade {}: {} {} {} @ {}",
            trade_id, trade.action, trade.quantity, trade.currency, trade.price
        );
        Ok(trade_id)
    }

    /// List trades, most recent first, optionally filtered by currency
    pub async fn list_trades(
        &self,
        currency: Option<&str>,
        limit: i64,
    ) -> Result<Vec<TradeRecord>, DatabaseError> {
        let records = match currency {
            Some(currency) => {
                sqlx::query_as::<_, TradeRecord>(
                    r#"
                    SELECT * FROM trades
                    WHERE currency = ?1
                    ORDER BY timestamp DESC, id DESC
                    LIMIT ?2
                    "#,
                )
                .bind(currency)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, TradeRecord>(
                    "SELECT * FROM trades ORDER BY timestamp DESC, id DESC LIMIT ?1",
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| {
            error!("Failed to list trades: {}", e);
            DatabaseError::QueryError(format!("Failed to list trades: {}", e))
        })?;

        Ok(records)
    }

    /// Get all positions, ordered by currency
    pub async fn get_positions(&self) -> Result<Vec<PositionRecord>, DatabaseError> {
        let records =
            sqlx::query_as::<_, PositionRecord>("SELECT * FROM portfolio ORDER BY currency")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    error!("Failed to get positions: {}", e);
                    DatabaseError::QueryError(format!("Failed to get positions: {}", e))
                })?;

        Ok(records)
    }

    /// Append an analysis record; no derived state
    pub async fn record_analysis(
        &self,
        currency: &str,
        analysis_type: &str,
        content: &str,
    ) -> Result<i64, DatabaseError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO analysis (timestamp, currency, analysis_type, content, created_at)
            VALUES (?1, ?2, ?3, ?4, ?1)
            "#,
        )
        .bind(now)
        .bind(currency)
        .bind(analysis_type)
        .bind(content)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to insert analysis record: {}", e);
            DatabaseError::QueryError(format!("Failed to insert analysis record: {}", e))
        })?;

        debug!("Recorded {} analysis for {}", analysis_type, currency);
        Ok(result.last_insert_rowid())
    }

    /// Get recent analysis records for a currency, newest first
    pub async fn list_analysis(
        &self,
        currency: &str,
        limit: i64,
    ) -> Result<Vec<AnalysisRecord>, DatabaseError> {
        let records = sqlx::query_as::<_, AnalysisRecord>(
            r#"
            SELECT * FROM analysis
            WHERE currency = ?1
            ORDER BY timestamp DESC, id DESC
            LIMIT ?2
            "#,
        )
        .bind(currency)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to list analysis records: {}", e);
            DatabaseError::QueryError(format!("Failed to list analysis records: {}", e))
        })?;

        Ok(records)
    }
}

/// Recompute the portfolio row for one currency inside the trade transaction
///
/// - buy, no position: insert with the trade's quantity and price
/// - buy, existing: quantity-weighted average cost over old and new
/// - sell (any non-buy action), no position: nothing happens
/// - sell, existing: quantity shrinks, average cost unchanged; a
///   non-positive result deletes the row so zero-quantity rows never persist
async fn apply_position_change(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    currency: &str,
    action: &str,
    quantity: f64,
    price: f64,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    let existing: Option<(f64, f64)> =
        sqlx::query_as("SELECT quantity, avg_price FROM portfolio WHERE currency = ?1")
            .bind(currency)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| {
                error!("Failed to read position for {}: {}", currency, e);
                DatabaseError::QueryError(format!("Failed to read position: {}", e))
            })?;

    match existing {
        Some((old_quantity, old_avg_price)) => {
            let (new_quantity, new_avg_price) = if action == "buy" {
                let new_quantity = old_quantity + quantity;
                let new_avg_price =
                    (old_quantity * old_avg_price + quantity * price) / new_quantity;
                (new_quantity, new_avg_price)
            } else {
                (old_quantity - quantity, old_avg_price)
            };

            let result = if new_quantity > 0.0 {
                sqlx::query(
                    r#"
                    UPDATE portfolio
                    SET quantity = ?1, avg_price = ?2, updated_at = ?3
                    WHERE currency = ?4
                    "#,
                )
                .bind(new_quantity)
                .bind(new_avg_price)
                .bind(now)
                .bind(currency)
                .execute(&mut **tx)
                .await
            } else {
                sqlx::query("DELETE FROM portfolio WHERE currency = ?1")
                    .bind(currency)
                    .execute(&mut **tx)
                    .await
            };

            result.map_err(|e| {
                error!("Failed to update position for {}: {}", currency, e);
                DatabaseError::QueryError(format!("Failed to update position: {}", e))
            })?;
        }
        None => {
            // A sell with no prior holding has no position effect.
            if action == "buy" {
                sqlx::query(
                    r#"
                    INSERT INTO portfolio (currency, quantity, avg_price, updated_at)
                    VALUES (?1, ?2, ?3, ?4)
                    "#,
                )
                .bind(currency)
                .bind(quantity)
                .bind(price)
                .bind(now)
                .execute(&mut **tx)
                .await
                .map_err(|e| {
                    error!("Failed to create position for {}: {}", currency, e);
                    DatabaseError::QueryError(format!("Failed to create position: {}", e))
                })?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::init_database;

    async fn store() -> LedgerStore {
        let pool = init_database("sqlite::memory:").await.unwrap();
        LedgerStore::new(pool)
    }

    fn buy(currency: &str, price: f64, quantity: f64) -> NewTrade {
        NewTrade::new(currency, "buy", price, quantity)
    }

    fn sell(currency: &str, price: f64, quantity: f64) -> NewTrade {
        NewTrade::new(currency, "sell", price, quantity)
    }

    #[tokio::test]
    async fn test_buy_creates_position() {
        let store = store().await;
        let trade_id = store.record_trade(buy("BTC", 100.0, 2.0)).await.unwrap();
        assert!(trade_id > 0);

        let positions = store.get_positions().await.unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].currency, "BTC");
        assert_eq!(positions[0].quantity, 2.0);
        assert_eq!(positions[0].avg_price, 100.0);
    }

    #[tokio::test]
    async fn test_weighted_average_cost_over_buys() {
        let store = store().await;
        let trades = [(100.0, 1.5), (250.0, 0.5), (90.0, 3.0)];

        for (price, quantity) in trades {
            store.record_trade(buy("ETH", price, quantity)).await.unwrap();
        }

        let total_qty: f64 = trades.iter().map(|(_, q)| q).sum();
        let expected_avg: f64 =
            trades.iter().map(|(p, q)| p * q).sum::<f64>() / total_qty;

        let positions = store.get_positions().await.unwrap();
        assert_eq!(positions.len(), 1);
        assert!((positions[0].quantity - total_qty).abs() < 1e-9);
        assert!((positions[0].avg_price - expected_avg).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_sell_reduces_quantity_but_not_avg_price() {
        let store = store().await;
        store.record_trade(buy("BTC", 100.0, 4.0)).await.unwrap();
        store.record_trade(sell("BTC", 500.0, 1.0)).await.unwrap();

        let positions = store.get_positions().await.unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].quantity, 3.0);
        assert_eq!(positions[0].avg_price, 100.0);
    }

    #[tokio::test]
    async fn test_full_sell_removes_position() {
        let store = store().await;
        store.record_trade(buy("BTC", 100.0, 2.0)).await.unwrap();
        store.record_trade(sell("BTC", 120.0, 2.0)).await.unwrap();

        let positions = store.get_positions().await.unwrap();
        assert!(positions.is_empty());
    }

    #[tokio::test]
    async fn test_oversell_removes_position() {
        let store = store().await;
        store.record_trade(buy("BTC", 100.0, 1.0)).await.unwrap();
        // Oversell is not guarded; the non-positive result removes the row.
        store.record_trade(sell("BTC", 100.0, 5.0)).await.unwrap();

        let positions = store.get_positions().await.unwrap();
        assert!(positions.is_empty());
    }

    #[tokio::test]
    async fn test_sell_without_position_is_position_noop() {
        let store = store().await;
        let trade_id = store.record_trade(sell("XRP", 500.0, 10.0)).await.unwrap();
        assert!(trade_id > 0);

        // The trade is recorded but no position row appears.
        let positions = store.get_positions().await.unwrap();
        assert!(positions.is_empty());

        let trades = store.list_trades(Some("XRP"), 10).await.unwrap();
        assert_eq!(trades.len(), 1);
    }

    #[tokio::test]
    async fn test_total_amount_equals_price_times_quantity() {
        let store = store().await;
        store.record_trade(buy("BTC", 123.45, 6.78)).await.unwrap();
        store.record_trade(sell("BTC", 123.45, 6.78)).await.unwrap();

        let trades = store.list_trades(Some("BTC"), 10).await.unwrap();
        for trade in trades {
            assert_eq!(trade.total_amount, trade.price * trade.quantity);
            assert_eq!(trade.total_amount, 123.45 * 6.78);
        }
    }

    #[tokio::test]
    async fn test_opaque_action_is_stored() {
        let store = store().await;
        // The store does not validate the side; unknown actions are kept
        // as-is and treated like a sell in the aggregate.
        let trade = NewTrade::new("BTC", "transfer", 10.0, 1.0);
        store.record_trade(trade).await.unwrap();

        let trades = store.list_trades(Some("BTC"), 10).await.unwrap();
        assert_eq!(trades[0].action, "transfer");
        assert!(store.get_positions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_trade_is_atomic() {
        let store = store().await;
        // Force the position step to fail after the trade insert.
        sqlx::query("DROP TABLE portfolio")
            .execute(&store.pool)
            .await
            .unwrap();

        let result = store.record_trade(buy("BTC", 100.0, 1.0)).await;
        assert!(result.is_err());

        // The trade insert must have been rolled back with it.
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM trades")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let store = store().await;

        store.record_trade(buy("BTC", 100.0, 2.0)).await.unwrap();
        let positions = store.get_positions().await.unwrap();
        assert_eq!(positions[0].quantity, 2.0);
        assert_eq!(positions[0].avg_price, 100.0);

        store.record_trade(buy("BTC", 200.0, 2.0)).await.unwrap();
        let positions = store.get_positions().await.unwrap();
        assert_eq!(positions[0].quantity, 4.0);
        assert_eq!(positions[0].avg_price, 150.0);

        store.record_trade(sell("BTC", 999.0, 4.0)).await.unwrap();
        let positions = store.get_positions().await.unwrap();
        assert!(positions.is_empty());

        let trades = store.list_trades(Some("BTC"), 10).await.unwrap();
        assert_eq!(trades.len(), 3);
        // Newest first: the sell comes back before the buys.
        assert_eq!(trades[0].action, "sell");
        assert_eq!(trades[0].price, 999.0);
        assert_eq!(trades[2].price, 100.0);
    }

    #[tokio::test]
    async fn test_list_trades_filters_and_limits() {
        let store = store().await;
        store.record_trade(buy("BTC", 100.0, 1.0)).await.unwrap();
        store.record_trade(buy("ETH", 10.0, 1.0)).await.unwrap();
        store.record_trade(buy("BTC", 110.0, 1.0)).await.unwrap();

        let btc = store.list_trades(Some("BTC"), 10).await.unwrap();
        assert_eq!(btc.len(), 2);
        assert!(btc.iter().all(|t| t.currency == "BTC"));

        let all = store.list_trades(None, 10).await.unwrap();
        assert_eq!(all.len(), 3);

        let limited = store.list_trades(None, 2).await.unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn test_positions_ordered_by_currency() {
        let store = store().await;
        store.record_trade(buy("XRP", 1.0, 100.0)).await.unwrap();
        store.record_trade(buy("BTC", 100.0, 1.0)).await.unwrap();
        store.record_trade(buy("ETH", 10.0, 5.0)).await.unwrap();

        let positions = store.get_positions().await.unwrap();
        let currencies: Vec<&str> = positions.iter().map(|p| p.currency.as_str()).collect();
        assert_eq!(currencies, vec!["BTC", "ETH", "XRP"]);
    }

    #[tokio::test]
    async fn test_record_and_list_analysis() {
        let store = store().await;
        let id = store
            .record_analysis("BTC", "ai_analysis", "Hold through the volatility.")
            .await
            .unwrap();
        assert!(id > 0);

        let records = store.list_analysis("BTC", 10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].analysis_type, "ai_analysis");
        assert_eq!(records[0].content, "Hold through the volatility.");

        // Analysis writes never touch the portfolio.
        assert!(store.get_positions().await.unwrap().is_empty());
    }
}
