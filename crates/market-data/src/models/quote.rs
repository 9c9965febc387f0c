use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Latest quote for a symbol.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LatestQuote {
    /// Current/last traded price
    pub price: Decimal,

    /// Provider-precomputed day-over-day change, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<Decimal>,

    /// Provider-precomputed day-over-day percent change, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<Decimal>,

    /// Timestamp of the quote
    pub timestamp: DateTime<Utc>,
}

/// One point of a historical price series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    /// Timestamp of the sample
    pub timestamp: DateTime<Utc>,

    /// Closing price at that timestamp
    pub price: Decimal,
}

impl SamplePoint {
    /// Create a new sample point.
    pub fn new(timestamp: DateTime<Utc>, price: Decimal) -> Self {
        Self { timestamp, price }
    }
}
