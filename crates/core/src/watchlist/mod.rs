//! Watchlist module - domain models, store, service, and traits.

mod watchlist_model;
mod watchlist_service;
mod watchlist_store;
mod watchlist_traits;

pub use watchlist_model::{
    ChartPoint, NewTrackedStock, SamplePoint, StockWithChart, SymbolValidation, TrackedStock,
    TrackedStockUpdate, Trend, WatchlistStats,
};
pub use watchlist_service::{WatchlistService, DEFAULT_PERIOD};
pub use watchlist_store::WatchlistStore;
pub use watchlist_traits::WatchlistServiceTrait;
