//! Tickerboard Market Data Crate
//!
//! Provider-agnostic market data fetching for the tickerboard watchlist.
//!
//! # Overview
//!
//! A snapshot for one symbol and one lookback period is assembled from three
//! conceptual queries - live quote, company name, historical candles - issued
//! against a chain of providers tried in a fixed order:
//!
//! ```text
//! +------------------+
//! |  ProviderChain   |  (try primary, then fallback)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |     Provider     |  (Finnhub, Yahoo Finance)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |  MarketSnapshot  |  (price, change, <=50 chart points)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Period`] - One of the four enumerated lookback windows
//! - [`MarketSnapshot`] - Assembled price/company/history bundle
//! - [`MarketDataProvider`] - Trait implemented by concrete providers
//! - [`SnapshotFetcher`] - Trait the service layer consumes (mockable)
//! - [`ProviderChain`] - Ordered fallback over the configured providers

pub mod chain;
pub mod errors;
pub mod models;
pub mod provider;

// Re-export all public types from models
pub use models::{LatestQuote, MarketSnapshot, ParsePeriodError, Period, SamplePoint};

// Re-export provider types
pub use provider::finnhub::FinnhubProvider;
pub use provider::yahoo::YahooProvider;
pub use provider::MarketDataProvider;

// Re-export chain types
pub use chain::{downsample, ProviderChain, SnapshotFetcher, MAX_CHART_POINTS};

pub use errors::MarketDataError;
