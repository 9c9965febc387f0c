//! Yahoo Finance market data provider.
//!
//! Keyless fallback provider backed by the `yahoo_finance_api` crate. Used
//! when no Finnhub credential is configured, or when the primary provider
//! fails for a symbol.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::{LatestQuote, Period, SamplePoint};
use crate::provider::MarketDataProvider;

const PROVIDER_ID: &str = "YAHOO";

/// Yahoo Finance market data provider.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider.
    pub fn new() -> Result<Self, MarketDataError> {
        let connector =
            yahoo::YahooConnector::new().map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to initialize Yahoo connector: {}", e),
            })?;
        Ok(Self { connector })
    }

    /// Chart interval/range tier for the intraday periods.
    ///
    /// Yahoo has no 7-day range, so the 1W window maps to the trading-week
    /// `5d` range at hourly resolution. The daily periods use the history
    /// API directly.
    fn intraday_tier(period: Period) -> Option<(&'static str, &'static str)> {
        match period {
            Period::OneDay => Some(("5m", "1d")),
            Period::OneWeek => Some(("60m", "5d")),
            Period::OneMonth | Period::SixMonths => None,
        }
    }

    fn map_error(symbol: &str, e: yahoo::YahooError) -> MarketDataError {
        if matches!(e, yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult) {
            MarketDataError::SymbolNotFound(symbol.to_string())
        } else {
            MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            }
        }
    }

    /// Convert chrono DateTime<Utc> to time::OffsetDateTime for the Yahoo API.
    fn chrono_to_offset_datetime(dt: DateTime<Utc>) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(dt.timestamp())
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
    }

    /// Convert a Yahoo chart quote to a sample point.
    fn yahoo_quote_to_sample(quote: &yahoo::Quote) -> Result<SamplePoint, MarketDataError> {
        let timestamp = Utc
            .timestamp_opt(quote.timestamp as i64, 0)
            .single()
            .ok_or_else(|| MarketDataError::ValidationFailed {
                message: format!("Invalid timestamp: {}", quote.timestamp),
            })?;

        let price = Decimal::from_f64_retain(quote.close).ok_or_else(|| {
            MarketDataError::ValidationFailed {
                message: format!("Failed to convert close price {} to Decimal", quote.close),
            }
        })?;

        Ok(SamplePoint::new(timestamp, price))
    }

    /// Previous trading day's close, for deriving the day change.
    ///
    /// Yahoo does not precompute d/dp the way Finnhub does; the last
    /// completed daily candle before the current one stands in for the
    /// previous close.
    async fn fetch_previous_close(&self, symbol: &str) -> Option<Decimal> {
        let end = Utc::now();
        let start = end - Duration::days(5);

        let response = self
            .connector
            .get_quote_history(
                symbol,
                Self::chrono_to_offset_datetime(start),
                Self::chrono_to_offset_datetime(end),
            )
            .await
            .ok()?;

        let quotes = response.quotes().ok()?;
        if quotes.len() < 2 {
            return None;
        }
        Decimal::from_f64_retain(quotes[quotes.len() - 2].close)
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_latest_quote(&self, symbol: &str) -> Result<LatestQuote, MarketDataError> {
        debug!("Fetching latest quote for {} from Yahoo", symbol);

        let response = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| Self::map_error(symbol, e))?;

        let last = response.last_quote().map_err(|e| {
            warn!("No quotes returned for {}: {}", symbol, e);
            MarketDataError::SymbolNotFound(symbol.to_string())
        })?;

        if last.close <= 0.0 {
            return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
        }

        let price = Decimal::from_f64_retain(last.close).ok_or_else(|| {
            MarketDataError::ValidationFailed {
                message: format!("Failed to convert close price {} to Decimal", last.close),
            }
        })?;

        let timestamp = Utc
            .timestamp_opt(last.timestamp as i64, 0)
            .single()
            .unwrap_or_else(Utc::now);

        let (change, change_percent) = match self.fetch_previous_close(symbol).await {
            Some(prev) if !prev.is_zero() => {
                let change = price - prev;
                (Some(change), Some(change / prev * Decimal::ONE_HUNDRED))
            }
            _ => {
                debug!("No previous close available for {}", symbol);
                (None, None)
            }
        };

        Ok(LatestQuote {
            price,
            change,
            change_percent,
            timestamp,
        })
    }

    async fn get_company_name(&self, symbol: &str) -> Result<Option<String>, MarketDataError> {
        debug!("Searching Yahoo for {} profile", symbol);

        let result = self
            .connector
            .search_ticker(symbol)
            .await
            .map_err(|e| Self::map_error(symbol, e))?;

        let name = result
            .quotes
            .iter()
            .find(|q| q.symbol == symbol)
            .map(|item| {
                if item.long_name.is_empty() {
                    item.short_name.clone()
                } else {
                    item.long_name.clone()
                }
            })
            .filter(|n| !n.is_empty());

        Ok(name)
    }

    async fn get_historical_quotes(
        &self,
        symbol: &str,
        period: Period,
    ) -> Result<Vec<SamplePoint>, MarketDataError> {
        let response = match Self::intraday_tier(period) {
            Some((interval, range)) => {
                debug!(
                    "Fetching {} chart for {} from Yahoo ({} @ {})",
                    period, symbol, range, interval
                );
                self.connector.get_quote_range(symbol, interval, range).await
            }
            None => {
                let end = Utc::now();
                let start = end - period.lookback();
                debug!(
                    "Fetching {} daily history for {} from Yahoo ({} to {})",
                    period,
                    symbol,
                    start.format("%Y-%m-%d"),
                    end.format("%Y-%m-%d")
                );
                self.connector
                    .get_quote_history(
                        symbol,
                        Self::chrono_to_offset_datetime(start),
                        Self::chrono_to_offset_datetime(end),
                    )
                    .await
            }
        }
        .map_err(|e| Self::map_error(symbol, e))?;

        let quotes = response.quotes().map_err(|e| {
            if matches!(e, yahoo::YahooError::NoQuotes) {
                MarketDataError::NoDataForRange
            } else {
                Self::map_error(symbol, e)
            }
        })?;

        if quotes.is_empty() {
            return Err(MarketDataError::NoDataForRange);
        }

        let mut points = Vec::with_capacity(quotes.len());
        for quote in &quotes {
            match Self::yahoo_quote_to_sample(quote) {
                Ok(point) => points.push(point),
                Err(e) => warn!("Skipping invalid Yahoo quote for {}: {}", symbol, e),
            }
        }

        points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        Ok(points)
    }
}
