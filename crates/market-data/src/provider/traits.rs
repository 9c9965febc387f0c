//! Market data provider trait definitions.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{LatestQuote, Period, SamplePoint};

/// Trait for market data providers.
///
/// Implement this trait to add support for a new market data source. A
/// provider answers the three queries a snapshot is assembled from: the live
/// quote, the company display name, and the historical series for a period.
/// The [`ProviderChain`](crate::ProviderChain) tries providers in a fixed
/// order and uses the first one that succeeds.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "FINNHUB" or "YAHOO". Used for
    /// logging and error attribution.
    fn id(&self) -> &'static str;

    /// Fetch the latest quote for a symbol.
    ///
    /// Implementations must fail with [`MarketDataError::SymbolNotFound`]
    /// when the provider returns no usable price (missing or `<= 0`).
    async fn get_latest_quote(&self, symbol: &str) -> Result<LatestQuote, MarketDataError>;

    /// Fetch the company display name for a symbol.
    ///
    /// Returns `Ok(None)` when the provider has no profile for the symbol;
    /// the caller falls back to the symbol itself.
    async fn get_company_name(&self, symbol: &str) -> Result<Option<String>, MarketDataError>;

    /// Fetch the historical price series for a symbol over a period.
    ///
    /// Each provider maps the period to its own resolution/window tiers.
    /// The returned points are ordered by timestamp ascending.
    async fn get_historical_quotes(
        &self,
        symbol: &str,
        period: Period,
    ) -> Result<Vec<SamplePoint>, MarketDataError>;
}
