//! Watchlist orchestration service.
//!
//! Sits between the HTTP surface and the two collaborators it owns handles
//! to: the in-memory [`WatchlistStore`] and the market data
//! [`SnapshotFetcher`]. Listing is a write-through refresh: observed live
//! values are persisted to the store as part of answering the read.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use log::warn;

use tickerboard_market_data::{MarketSnapshot, Period, SnapshotFetcher};

use super::watchlist_model::{
    ChartPoint, NewTrackedStock, SamplePoint, StockWithChart, SymbolValidation, TrackedStock,
    TrackedStockUpdate, Trend, WatchlistStats,
};
use super::watchlist_store::WatchlistStore;
use super::watchlist_traits::WatchlistServiceTrait;
use crate::errors::{Error, Result, ValidationError};

/// Period used when a request does not specify one (add/validate).
pub const DEFAULT_PERIOD: Period = Period::OneDay;

/// Service orchestrating the watchlist.
pub struct WatchlistService {
    store: Arc<WatchlistStore>,
    market_data: Arc<dyn SnapshotFetcher>,
}

impl WatchlistService {
    /// Creates a new WatchlistService instance.
    pub fn new(store: Arc<WatchlistStore>, market_data: Arc<dyn SnapshotFetcher>) -> Self {
        Self { store, market_data }
    }

    fn snapshot_samples(snapshot: &MarketSnapshot, period: Period) -> Vec<SamplePoint> {
        snapshot
            .samples
            .iter()
            .map(|p| SamplePoint {
                timestamp: p.timestamp,
                price: p.price,
                period,
            })
            .collect()
    }

    /// Fetch live data for one stock and write it through to the store.
    async fn refresh(&self, stock: &TrackedStock, period: Period) -> Result<StockWithChart> {
        let snapshot = self.market_data.fetch_snapshot(&stock.symbol, period).await?;

        let updated = self
            .store
            .update(
                &stock.id,
                TrackedStockUpdate {
                    current_price: Some(snapshot.current_price),
                    change_amount: Some(snapshot.change_amount),
                    change_percent: Some(snapshot.change_percent),
                },
            )?
            // Removed concurrently; present this response from the snapshot
            .unwrap_or_else(|| stock.clone());

        self.store
            .replace_samples(&stock.id, period, Self::snapshot_samples(&snapshot, period))?;
        let chart_data = self
            .store
            .samples(&stock.id, period)?
            .into_iter()
            .map(ChartPoint::from)
            .collect();

        Ok(StockWithChart {
            trend: Trend::from_change_percent(snapshot.change_percent),
            stock: updated,
            chart_data,
        })
    }

    /// Last-known view of a stock, used when its refresh failed.
    fn stale(stock: TrackedStock) -> StockWithChart {
        StockWithChart {
            trend: Trend::from_change_percent(stock.change_percent),
            chart_data: Vec::new(),
            stock,
        }
    }
}

#[async_trait]
impl WatchlistServiceTrait for WatchlistService {
    async fn list_stocks(&self, period: Period) -> Result<Vec<StockWithChart>> {
        let stocks = self.store.list()?;

        // One isolated fetch per stock; results keep the store's order.
        let enriched = join_all(stocks.into_iter().map(|stock| async move {
            match self.refresh(&stock, period).await {
                Ok(view) => view,
                Err(e) => {
                    warn!("Falling back to stored data for {}: {}", stock.symbol, e);
                    Self::stale(stock)
                }
            }
        }))
        .await;

        Ok(enriched)
    }

    async fn add_stock(&self, symbol: &str) -> Result<StockWithChart> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(ValidationError::MissingField("symbol".to_string()).into());
        }

        if let Some(existing) = self.store.get_by_symbol(symbol)? {
            return Err(Error::ConstraintViolation(format!(
                "{} is already in the watchlist",
                existing.symbol
            )));
        }

        // Not admitted unless the provider confirms a usable price
        let snapshot = self.market_data.fetch_snapshot(symbol, DEFAULT_PERIOD).await?;

        let stock = self.store.add(NewTrackedStock {
            symbol: snapshot.symbol.clone(),
            company_name: snapshot.company_name.clone(),
            current_price: snapshot.current_price,
            change_amount: snapshot.change_amount,
            change_percent: snapshot.change_percent,
        })?;

        self.store.replace_samples(
            &stock.id,
            DEFAULT_PERIOD,
            Self::snapshot_samples(&snapshot, DEFAULT_PERIOD),
        )?;
        let chart_data = self
            .store
            .samples(&stock.id, DEFAULT_PERIOD)?
            .into_iter()
            .map(ChartPoint::from)
            .collect();

        Ok(StockWithChart {
            trend: Trend::from_change_percent(stock.change_percent),
            stock,
            chart_data,
        })
    }

    async fn remove_stock(&self, id: &str) -> Result<()> {
        if self.store.remove(id)? {
            Ok(())
        } else {
            Err(Error::NotFound(format!("Stock {} not found", id)))
        }
    }

    fn get_stats(&self) -> Result<WatchlistStats> {
        self.store.stats()
    }

    async fn validate_symbol(&self, symbol: &str) -> Result<SymbolValidation> {
        let snapshot = self.market_data.fetch_snapshot(symbol, DEFAULT_PERIOD).await?;

        Ok(SymbolValidation {
            valid: true,
            symbol: snapshot.symbol,
            company_name: snapshot.company_name,
            current_price: snapshot.current_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tickerboard_market_data::MarketDataError;

    /// Stub fetcher with a fixed price per call and a configurable set of
    /// failing symbols.
    struct StubFetcher {
        price: Mutex<Decimal>,
        failing: Mutex<HashSet<String>>,
    }

    impl StubFetcher {
        fn new(price: Decimal) -> Self {
            Self {
                price: Mutex::new(price),
                failing: Mutex::new(HashSet::new()),
            }
        }

        fn set_price(&self, price: Decimal) {
            *self.price.lock().unwrap() = price;
        }

        fn fail_symbol(&self, symbol: &str) {
            self.failing.lock().unwrap().insert(symbol.to_uppercase());
        }
    }

    #[async_trait]
    impl SnapshotFetcher for StubFetcher {
        async fn fetch_snapshot(
            &self,
            symbol: &str,
            _period: Period,
        ) -> std::result::Result<MarketSnapshot, MarketDataError> {
            let symbol = symbol.trim().to_uppercase();
            if self.failing.lock().unwrap().contains(&symbol) {
                return Err(MarketDataError::SymbolNotFound(symbol));
            }

            let price = *self.price.lock().unwrap();
            Ok(MarketSnapshot {
                company_name: format!("{} Inc", symbol),
                symbol,
                current_price: price,
                change_amount: dec!(1.5),
                change_percent: dec!(1.01),
                samples: vec![
                    tickerboard_market_data::SamplePoint::new(Utc::now(), price - dec!(1)),
                    tickerboard_market_data::SamplePoint::new(Utc::now(), price),
                ],
            })
        }
    }

    fn service() -> (Arc<WatchlistStore>, Arc<StubFetcher>, WatchlistService) {
        let store = Arc::new(WatchlistStore::new());
        let fetcher = Arc::new(StubFetcher::new(dec!(150.25)));
        let service = WatchlistService::new(store.clone(), fetcher.clone());
        (store, fetcher, service)
    }

    #[tokio::test]
    async fn test_add_stock_admits_validated_symbol() {
        let (store, _fetcher, service) = service();

        let added = service.add_stock("aapl").await.unwrap();
        assert_eq!(added.stock.symbol, "AAPL");
        assert_eq!(added.stock.company_name, "AAPL Inc");
        assert_eq!(added.stock.current_price, dec!(150.25));
        assert_eq!(added.trend, Trend::Positive);
        assert_eq!(added.chart_data.len(), 2);

        assert!(store.get_by_symbol("AAPL").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_add_stock_rejects_empty_symbol() {
        let (store, _fetcher, service) = service();

        let err = service.add_stock("   ").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.list().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_add_stock_conflicts_on_any_case_variant() {
        let (store, _fetcher, service) = service();
        service.add_stock("AAPL").await.unwrap();

        let err = service.add_stock("aapl").await.unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_stock_not_admitted_on_upstream_failure() {
        let (store, fetcher, service) = service();
        fetcher.fail_symbol("ZZZINVALID");

        let err = service.add_stock("zzzinvalid").await.unwrap_err();
        assert!(matches!(err, Error::MarketData(_)));
        assert!(store.get_by_symbol("ZZZINVALID").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_refreshes_and_keeps_order() {
        let (store, fetcher, service) = service();
        service.add_stock("AAPL").await.unwrap();
        service.add_stock("MSFT").await.unwrap();
        service.add_stock("GOOG").await.unwrap();

        fetcher.set_price(dec!(200));
        let listed = service.list_stocks(Period::OneDay).await.unwrap();

        let symbols: Vec<&str> = listed.iter().map(|v| v.stock.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["GOOG", "MSFT", "AAPL"]);
        assert!(listed.iter().all(|v| v.stock.current_price == dec!(200)));

        // The refresh is written through to the store
        let stored = store.get_by_symbol("AAPL").unwrap().unwrap();
        assert_eq!(stored.current_price, dec!(200));
    }

    #[tokio::test]
    async fn test_list_tolerates_single_symbol_failure() {
        let (_store, fetcher, service) = service();
        service.add_stock("AAPL").await.unwrap();
        service.add_stock("MSFT").await.unwrap();
        service.add_stock("GOOG").await.unwrap();

        fetcher.set_price(dec!(200));
        fetcher.fail_symbol("MSFT");
        let listed = service.list_stocks(Period::OneWeek).await.unwrap();
        assert_eq!(listed.len(), 3);

        let msft = listed.iter().find(|v| v.stock.symbol == "MSFT").unwrap();
        // Stale values from the original add, and no chart
        assert_eq!(msft.stock.current_price, dec!(150.25));
        assert!(msft.chart_data.is_empty());
        assert_eq!(msft.trend, Trend::Positive);

        for view in listed.iter().filter(|v| v.stock.symbol != "MSFT") {
            assert_eq!(view.stock.current_price, dec!(200));
            assert!(!view.chart_data.is_empty());
        }
    }

    #[tokio::test]
    async fn test_remove_stock_then_not_found() {
        let (_store, _fetcher, service) = service();
        let added = service.add_stock("AAPL").await.unwrap();

        service.remove_stock(&added.stock.id).await.unwrap();
        let err = service.remove_stock(&added.stock.id).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_stats_reflect_current_records() {
        let (_store, _fetcher, service) = service();
        service.add_stock("AAPL").await.unwrap();
        service.add_stock("MSFT").await.unwrap();

        let stats = service.get_stats().unwrap();
        assert_eq!(stats.total_stocks, 2);
        assert_eq!(stats.gainers, 2);
        assert_eq!(stats.losers, 0);
    }

    #[tokio::test]
    async fn test_validate_symbol_does_not_touch_store() {
        let (store, _fetcher, service) = service();

        let validation = service.validate_symbol("nvda").await.unwrap();
        assert!(validation.valid);
        assert_eq!(validation.symbol, "NVDA");
        assert_eq!(validation.current_price, dec!(150.25));

        assert_eq!(store.list().unwrap().len(), 0);
    }
}
