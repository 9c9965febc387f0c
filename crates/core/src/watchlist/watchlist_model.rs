//! Watchlist domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tickerboard_market_data::Period;

/// A stock tracked on the watchlist.
///
/// The symbol is unique case-insensitively and stored upper-case; the
/// price/change fields hold the last successfully fetched values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackedStock {
    pub id: String,
    pub symbol: String,
    pub company_name: String,
    pub current_price: Decimal,
    pub change_amount: Decimal,
    pub change_percent: Decimal,
    pub added_at: DateTime<Utc>,
}

/// Input model for admitting a validated symbol to the watchlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrackedStock {
    pub symbol: String,
    pub company_name: String,
    pub current_price: Decimal,
    pub change_amount: Decimal,
    pub change_percent: Decimal,
}

/// Partial update applied when fresh market data arrives.
#[derive(Debug, Clone, Default)]
pub struct TrackedStockUpdate {
    pub current_price: Option<Decimal>,
    pub change_amount: Option<Decimal>,
    pub change_percent: Option<Decimal>,
}

/// One historical chart sample owned by a tracked stock.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePoint {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
    /// The lookback bucket this sample was fetched for
    pub period: Period,
}

/// Chart point as rendered by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: DateTime<Utc>,
    pub price: Decimal,
}

impl From<SamplePoint> for ChartPoint {
    fn from(point: SamplePoint) -> Self {
        Self {
            date: point.timestamp,
            price: point.price,
        }
    }
}

/// Derived direction tag for a stock's change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Positive,
    Negative,
}

impl Trend {
    /// Positive when the percent change is zero or better.
    pub fn from_change_percent(percent: Decimal) -> Self {
        if percent >= Decimal::ZERO {
            Trend::Positive
        } else {
            Trend::Negative
        }
    }
}

/// A tracked stock merged with its chart data and trend tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockWithChart {
    #[serde(flatten)]
    pub stock: TrackedStock,
    pub chart_data: Vec<ChartPoint>,
    pub trend: Trend,
}

/// Aggregate watchlist statistics, recomputed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistStats {
    pub total_stocks: i64,
    pub gainers: i64,
    pub losers: i64,
}

/// Outcome of a standalone symbol validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolValidation {
    pub valid: bool,
    pub symbol: String,
    pub company_name: String,
    pub current_price: Decimal,
}
