//! Lookback periods for historical chart data.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when parsing an unrecognized period string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown period: {0}")]
pub struct ParsePeriodError(pub String);

/// One of the four enumerated lookback windows.
///
/// The wire form is exactly `1D`, `1W`, `1M` or `6M`; anything else fails
/// request validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "6M")]
    SixMonths,
}

impl Period {
    /// Wire representation of the period.
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneDay => "1D",
            Period::OneWeek => "1W",
            Period::OneMonth => "1M",
            Period::SixMonths => "6M",
        }
    }

    /// How far back the historical window reaches from "now".
    pub fn lookback(&self) -> Duration {
        match self {
            Period::OneDay => Duration::days(1),
            Period::OneWeek => Duration::days(7),
            Period::OneMonth => Duration::days(30),
            Period::SixMonths => Duration::days(180),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1D" => Ok(Period::OneDay),
            "1W" => Ok(Period::OneWeek),
            "1M" => Ok(Period::OneMonth),
            "6M" => Ok(Period::SixMonths),
            other => Err(ParsePeriodError(other.to_string())),
        }
    }
}
