use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::quote::SamplePoint;

/// Point-in-time price/company/history bundle for one symbol and period.
///
/// Transient value assembled by the provider chain; never persisted as its
/// own entity.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    /// Upper-cased ticker symbol
    pub symbol: String,

    /// Company display name (falls back to the symbol)
    pub company_name: String,

    /// Current price
    pub current_price: Decimal,

    /// Absolute change over the requested period
    pub change_amount: Decimal,

    /// Percent change over the requested period
    pub change_percent: Decimal,

    /// Down-sampled historical series, ascending by timestamp, at most
    /// [`MAX_CHART_POINTS`](crate::MAX_CHART_POINTS) entries
    pub samples: Vec<SamplePoint>,
}
