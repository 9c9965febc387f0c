//! Provider chain - snapshot assembly with ordered provider fallback.
//!
//! The chain is the main entry point of this crate. It holds the configured
//! providers in a fixed try order (primary first), asks each in turn for the
//! pieces of a snapshot, and returns the first fully assembled result.
//! Fallback is strictly try-next-in-order: results are never merged or raced,
//! and no provider call is retried.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{LatestQuote, MarketSnapshot, Period, SamplePoint};
use crate::provider::MarketDataProvider;

/// Maximum number of chart points returned in a snapshot.
pub const MAX_CHART_POINTS: usize = 50;

/// Trait for snapshot fetching.
///
/// This is the seam the service layer depends on; tests substitute a stub
/// implementation instead of talking to real providers.
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    /// Fetch a normalized snapshot for one symbol and one period.
    async fn fetch_snapshot(
        &self,
        symbol: &str,
        period: Period,
    ) -> Result<MarketSnapshot, MarketDataError>;
}

/// Ordered chain of market data providers.
pub struct ProviderChain {
    providers: Vec<Arc<dyn MarketDataProvider>>,
}

impl ProviderChain {
    /// Create a chain that tries `providers` in the given order.
    pub fn new(providers: Vec<Arc<dyn MarketDataProvider>>) -> Self {
        Self { providers }
    }

    /// Assemble a snapshot from a single provider.
    ///
    /// Three queries: live quote, company name, historical candles. A missing
    /// profile falls back to the symbol; an empty historical window yields an
    /// empty chart. Everything else fails the provider and moves the chain on.
    async fn snapshot_from(
        &self,
        provider: &dyn MarketDataProvider,
        symbol: &str,
        period: Period,
    ) -> Result<MarketSnapshot, MarketDataError> {
        let latest = provider.get_latest_quote(symbol).await?;

        if latest.price <= Decimal::ZERO {
            return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
        }

        let company_name = provider
            .get_company_name(symbol)
            .await?
            .unwrap_or_else(|| symbol.to_string());

        let raw = match provider.get_historical_quotes(symbol, period).await {
            Ok(points) => points,
            Err(MarketDataError::NoDataForRange) => Vec::new(),
            Err(e) => return Err(e),
        };

        let samples = downsample(raw, MAX_CHART_POINTS);
        let (change_amount, change_percent) = compute_change(period, &latest, &samples);

        Ok(MarketSnapshot {
            symbol: symbol.to_string(),
            company_name,
            current_price: latest.price,
            change_amount,
            change_percent,
            samples,
        })
    }
}

#[async_trait]
impl SnapshotFetcher for ProviderChain {
    async fn fetch_snapshot(
        &self,
        symbol: &str,
        period: Period,
    ) -> Result<MarketSnapshot, MarketDataError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(MarketDataError::ValidationFailed {
                message: "Symbol must not be empty".to_string(),
            });
        }

        let mut last_error = None;

        for provider in &self.providers {
            debug!("Trying provider {} for {}", provider.id(), symbol);
            match self.snapshot_from(provider.as_ref(), &symbol, period).await {
                Ok(snapshot) => return Ok(snapshot),
                Err(e) => {
                    warn!("Provider {} failed for {}: {}", provider.id(), symbol, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(MarketDataError::NoProvidersAvailable))
    }
}

/// Reduce a series to at most `max_points` entries by fixed-stride decimation.
///
/// The stride is `ceil(len / max_points)`, starting at index 0, preserving
/// chronological order. This is a simple decimation, not a statistically
/// representative resample.
pub fn downsample(samples: Vec<SamplePoint>, max_points: usize) -> Vec<SamplePoint> {
    if max_points == 0 || samples.len() <= max_points {
        return samples;
    }
    let stride = samples.len().div_ceil(max_points);
    samples.into_iter().step_by(stride).collect()
}

/// Compute (change amount, percent change) for a period.
///
/// The 1D period uses the provider's own precomputed day-over-day fields (0
/// when absent); all other periods span the down-sampled series from first to
/// last sample, with a 0 percent when the first price is 0.
fn compute_change(
    period: Period,
    latest: &LatestQuote,
    samples: &[SamplePoint],
) -> (Decimal, Decimal) {
    if period == Period::OneDay {
        return (
            latest.change.unwrap_or(Decimal::ZERO),
            latest.change_percent.unwrap_or(Decimal::ZERO),
        );
    }

    match (samples.first(), samples.last()) {
        (Some(first), Some(last)) if samples.len() > 1 => {
            let amount = last.price - first.price;
            let percent = if first.price.is_zero() {
                Decimal::ZERO
            } else {
                amount / first.price * Decimal::ONE_HUNDRED
            };
            (amount, percent)
        }
        _ => (Decimal::ZERO, Decimal::ZERO),
    }
}
