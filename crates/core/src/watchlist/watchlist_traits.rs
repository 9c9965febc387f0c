use async_trait::async_trait;

use tickerboard_market_data::Period;

use super::watchlist_model::{StockWithChart, SymbolValidation, WatchlistStats};
use crate::errors::Result;

/// Trait for watchlist orchestration operations.
#[async_trait]
pub trait WatchlistServiceTrait: Send + Sync {
    /// Every tracked stock, refreshed with live data for `period` where
    /// possible, in most-recently-added order. A single symbol's upstream
    /// failure never fails the whole list.
    async fn list_stocks(&self, period: Period) -> Result<Vec<StockWithChart>>;

    /// Validate `symbol` against the market data provider and admit it.
    async fn add_stock(&self, symbol: &str) -> Result<StockWithChart>;

    /// Remove a stock by id.
    async fn remove_stock(&self, id: &str) -> Result<()>;

    /// Aggregate statistics over the current watchlist.
    fn get_stats(&self) -> Result<WatchlistStats>;

    /// Check a symbol against the market data provider without touching the
    /// watchlist.
    async fn validate_symbol(&self, symbol: &str) -> Result<SymbolValidation>;
}
