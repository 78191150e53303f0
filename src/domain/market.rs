//! Market-data primitives
//!
//! `MarketData<T>` is the explicit unavailability marker for the
//! degrade-to-empty call paths: callers must treat `Unavailable` as
//! "the exchange could not be reached", never as a zero-valued response.

use serde::{Deserialize, Serialize};

/// Result of a market-data call that never raises on transport failure
#[derive(Debug, Clone, PartialEq)]
pub enum MarketData<T> {
    /// The exchange answered with a usable value
    Available(T),
    /// Transport/HTTP/parse failure; details were logged at the call site
    Unavailable,
}

impl<T> MarketData<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, MarketData::Available(_))
    }

    /// Convert into an `Option`, discarding the unavailability marker
    pub fn available(self) -> Option<T> {
        match self {
            MarketData::Available(value) => Some(value),
            MarketData::Unavailable => None,
        }
    }

    pub fn as_ref(&self) -> MarketData<&T> {
        match self {
            MarketData::Available(value) => MarketData::Available(value),
            MarketData::Unavailable => MarketData::Unavailable,
        }
    }
}

/// Direction of a trade order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Ledger representation ("buy" / "sell")
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }

    /// Coinone order endpoint segment ("bid" for buys, "ask" for sells)
    pub fn api_path(&self) -> &'static str {
        match self {
            OrderSide::Buy => "bid",
            OrderSide::Sell => "ask",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_data_available() {
        let data = MarketData::Available(42);
        assert!(data.is_available());
        assert_eq!(data.available(), Some(42));
    }

    #[test]
    fn test_market_data_unavailable() {
        let data: MarketData<i32> = MarketData::Unavailable;
        assert!(!data.is_available());
        assert_eq!(data.available(), None);
    }

    #[test]
    fn test_unavailable_is_not_zero() {
        // An unavailable result must stay distinguishable from a real zero.
        let zero = MarketData::Available(0.0_f64);
        let gone: MarketData<f64> = MarketData::Unavailable;
        assert!(zero.is_available());
        assert_ne!(zero, gone);
    }

    #[test]
    fn test_order_side_mapping() {
        assert_eq!(OrderSide::Buy.as_str(), "buy");
        assert_eq!(OrderSide::Sell.as_str(), "sell");
        assert_eq!(OrderSide::Buy.api_path(), "bid");
        assert_eq!(OrderSide::Sell.api_path(), "ask");
    }
}
