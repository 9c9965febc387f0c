//! Tickerboard core crate.
//!
//! The watchlist domain: tracked stocks and their chart samples held in an
//! in-memory store, and the orchestration service that refreshes them from
//! market data providers. The HTTP surface lives in `apps/server`; market
//! data fetching lives in `tickerboard-market-data`.

pub mod errors;
pub mod watchlist;

pub use errors::{Error, Result, ValidationError};
