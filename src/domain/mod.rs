//! Domain types shared across the dashboard: market-data availability,
//! order sides, news items, and analysis-prompt construction.

pub mod analysis;
pub mod market;
pub mod news;
