//! Finnhub market data provider implementation.
//!
//! This module provides market data from Finnhub API:
//! - Live quotes via the /quote endpoint
//! - Company names via the /stock/profile2 endpoint
//! - Historical candles via the /stock/candle endpoint
//!
//! Finnhub free tier is limited to 60 API calls per minute.
//! API documentation: https://finnhub.io/docs/api

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{LatestQuote, Period, SamplePoint};
use crate::provider::MarketDataProvider;

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER_ID: &str = "FINNHUB";

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /quote endpoint
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Current price
    c: Option<f64>,
    /// Change since previous close
    d: Option<f64>,
    /// Percent change since previous close
    dp: Option<f64>,
    /// Open price of the day
    o: Option<f64>,
    /// Timestamp (Unix)
    t: Option<i64>,
    // Note: h (high), l (low), pc (previous close) exist but are not used
}

/// Response from /stock/candle endpoint
#[derive(Debug, Deserialize)]
struct CandleResponse {
    /// Status: "ok" or "no_data"
    s: String,
    /// Close prices
    #[serde(default)]
    c: Vec<f64>,
    /// Timestamps (Unix)
    #[serde(default)]
    t: Vec<i64>,
}

/// Response from /stock/profile2 endpoint
#[derive(Debug, Deserialize)]
struct ProfileResponse {
    /// Company name
    name: Option<String>,
}

/// Error response from Finnhub
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

// ============================================================================
// FinnhubProvider
// ============================================================================

/// Finnhub market data provider.
///
/// Requires an API key; acts as the primary provider when one is configured.
pub struct FinnhubProvider {
    client: Client,
    api_key: String,
}

impl FinnhubProvider {
    /// Create a new Finnhub provider with the given API key.
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, api_key }
    }

    /// Candle resolution tier for a period.
    ///
    /// Intraday minutes for the short windows, daily candles for the rest.
    fn resolution(period: Period) -> &'static str {
        match period {
            Period::OneDay => "1",
            Period::OneWeek => "5",
            Period::OneMonth | Period::SixMonths => "D",
        }
    }

    /// Make a GET request to the Finnhub API.
    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let url = format!("{}{}", BASE_URL, endpoint);

        let mut request = self.client.get(&url);

        // Add API key as header (more secure than query param)
        request = request.header("X-Finnhub-Token", &self.api_key);

        // Add query parameters
        for (key, value) in params {
            request = request.query(&[(key, value)]);
        }

        debug!(
            "Finnhub request: {} with {} params",
            endpoint,
            params.len()
        );

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: PROVIDER_ID.to_string(),
                }
            } else {
                MarketDataError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    message: format!("Request failed: {}", e),
                }
            }
        })?;

        let status = response.status();

        // Handle rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        // Handle unauthorized (invalid API key)
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: "Invalid or missing API key".to_string(),
            });
        }

        // Handle forbidden (API key quota exceeded)
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            // Try to parse error message
            if let Ok(error_resp) = serde_json::from_str::<ErrorResponse>(&body) {
                if let Some(error_msg) = error_resp.error {
                    return Err(MarketDataError::ProviderError {
                        provider: PROVIDER_ID.to_string(),
                        message: error_msg,
                    });
                }
            }

            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {} - {}", status, body),
            });
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to read response: {}", e),
            })
    }

    /// Fetch latest quote from /quote endpoint.
    async fn fetch_latest_quote(&self, symbol: &str) -> Result<LatestQuote, MarketDataError> {
        let params = [("symbol", symbol)];
        let text = self.fetch("/quote", &params).await?;

        let response: QuoteResponse = serde_json::from_str(&text).map_err(|e| {
            MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse quote response: {}", e),
            }
        })?;

        // Finnhub returns 0 for unknown symbols instead of an error
        let price = response.c.unwrap_or(0.0);
        if price <= 0.0 && response.o.unwrap_or(0.0) == 0.0 {
            return Err(MarketDataError::SymbolNotFound(format!(
                "Symbol not found or no trading data: {}",
                symbol
            )));
        }

        let price_decimal = Decimal::try_from(price).map_err(|_| {
            MarketDataError::ValidationFailed {
                message: format!("Invalid price: {}", price),
            }
        })?;

        let timestamp = response
            .t
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(Utc::now);

        Ok(LatestQuote {
            price: price_decimal,
            change: response.d.and_then(|v| Decimal::try_from(v).ok()),
            change_percent: response.dp.and_then(|v| Decimal::try_from(v).ok()),
            timestamp,
        })
    }

    /// Fetch historical candles from /stock/candle endpoint.
    async fn fetch_historical_quotes(
        &self,
        symbol: &str,
        period: Period,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SamplePoint>, MarketDataError> {
        let from_ts = start.timestamp().to_string();
        let to_ts = end.timestamp().to_string();

        let params = [
            ("symbol", symbol),
            ("resolution", Self::resolution(period)),
            ("from", &from_ts),
            ("to", &to_ts),
        ];

        let text = self.fetch("/stock/candle", &params).await?;

        let response: CandleResponse = serde_json::from_str(&text).map_err(|e| {
            MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse candle response: {}", e),
            }
        })?;

        // Check response status
        if response.s == "no_data" {
            return Err(MarketDataError::NoDataForRange);
        }

        if response.s != "ok" {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Unexpected candle status: {}", response.s),
            });
        }

        if response.c.len() != response.t.len() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: "Mismatched array lengths in candle response".to_string(),
            });
        }

        if response.t.is_empty() {
            return Err(MarketDataError::NoDataForRange);
        }

        let mut points = Vec::with_capacity(response.t.len());

        for (i, (&ts, &close)) in response.t.iter().zip(response.c.iter()).enumerate() {
            let timestamp = match Utc.timestamp_opt(ts, 0).single() {
                Some(ts) => ts,
                None => {
                    warn!("Invalid timestamp at index {}: {}", i, ts);
                    continue;
                }
            };

            let price = match Decimal::try_from(close) {
                Ok(d) => d,
                Err(_) => {
                    warn!("Invalid close price at index {}: {}", i, close);
                    continue;
                }
            };

            points.push(SamplePoint::new(timestamp, price));
        }

        // Sort by timestamp ascending
        points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        debug!(
            "Finnhub: fetched {} candles for {} ({} to {})",
            points.len(),
            symbol,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        );

        Ok(points)
    }

    /// Fetch company name from /stock/profile2 endpoint.
    async fn fetch_company_name(&self, symbol: &str) -> Result<Option<String>, MarketDataError> {
        let params = [("symbol", symbol)];
        let text = self.fetch("/stock/profile2", &params).await?;

        // Finnhub answers with an empty object for unknown symbols
        if text.trim() == "{}" {
            return Ok(None);
        }

        let response: ProfileResponse = serde_json::from_str(&text).map_err(|e| {
            MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse profile response: {}", e),
            }
        })?;

        Ok(response.name.filter(|n| !n.is_empty()))
    }
}

// ============================================================================
// MarketDataProvider Implementation
// ============================================================================

#[async_trait]
impl MarketDataProvider for FinnhubProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_latest_quote(&self, symbol: &str) -> Result<LatestQuote, MarketDataError> {
        debug!("Fetching latest quote for {} from Finnhub", symbol);
        self.fetch_latest_quote(symbol).await
    }

    async fn get_company_name(&self, symbol: &str) -> Result<Option<String>, MarketDataError> {
        debug!("Fetching profile for {} from Finnhub", symbol);
        self.fetch_company_name(symbol).await
    }

    async fn get_historical_quotes(
        &self,
        symbol: &str,
        period: Period,
    ) -> Result<Vec<SamplePoint>, MarketDataError> {
        let end = Utc::now();
        let start = end - period.lookback();

        debug!(
            "Fetching {} candles for {} from {} to {} from Finnhub",
            period,
            symbol,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        );

        self.fetch_historical_quotes(symbol, period, start, end)
            .await
    }
}

// ============================================================================
// Tests
// ============================================================================
