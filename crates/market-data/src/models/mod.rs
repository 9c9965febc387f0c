//! Market data models
//!
//! - `period` - Enumerated lookback windows (Period)
//! - `quote` - Quote data structures (LatestQuote, SamplePoint)
//! - `snapshot` - Assembled per-symbol snapshot (MarketSnapshot)

mod period;
mod quote;
mod snapshot;

pub use period::{ParsePeriodError, Period};
pub use quote::{LatestQuote, SamplePoint};
pub use snapshot::MarketSnapshot;
