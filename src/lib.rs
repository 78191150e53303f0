//! Coinvest Dashboard Library
//!
//! Core components for a personal crypto-investment dashboard: a signed
//! Coinone API client, a SQLite trade ledger with a derived portfolio
//! aggregate, a news fetcher, and a chat-completion client for
//! model-generated investment analysis.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod persistence;
