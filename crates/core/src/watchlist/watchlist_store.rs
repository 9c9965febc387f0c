//! In-memory watchlist store.
//!
//! Owns every `TrackedStock` and its `SamplePoint`s. Constructed explicitly
//! and shared as `Arc<WatchlistStore>` so tests can instantiate isolated
//! instances; nothing here is process-global. State lives for the lifetime
//! of the process only.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use tickerboard_market_data::Period;

use super::watchlist_model::{
    NewTrackedStock, SamplePoint, TrackedStock, TrackedStockUpdate, WatchlistStats,
};
use crate::errors::{Error, Result};

/// Keyed in-memory collection of tracked stocks and their chart samples.
///
/// Every mutation is atomic with respect to a single record. A poisoned lock
/// surfaces as [`Error::Storage`].
#[derive(Default)]
pub struct WatchlistStore {
    stocks: RwLock<HashMap<String, TrackedStock>>,
    samples: RwLock<HashMap<String, Vec<SamplePoint>>>,
}

impl WatchlistStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn stocks_read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, TrackedStock>>> {
        self.stocks
            .read()
            .map_err(|_| Error::Storage("stocks lock poisoned".to_string()))
    }

    fn stocks_write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, TrackedStock>>> {
        self.stocks
            .write()
            .map_err(|_| Error::Storage("stocks lock poisoned".to_string()))
    }

    fn samples_read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Vec<SamplePoint>>>> {
        self.samples
            .read()
            .map_err(|_| Error::Storage("samples lock poisoned".to_string()))
    }

    fn samples_write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Vec<SamplePoint>>>> {
        self.samples
            .write()
            .map_err(|_| Error::Storage("samples lock poisoned".to_string()))
    }

    /// All tracked stocks, most recently added first.
    pub fn list(&self) -> Result<Vec<TrackedStock>> {
        let stocks = self.stocks_read()?;
        let mut all: Vec<TrackedStock> = stocks.values().cloned().collect();
        all.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        Ok(all)
    }

    /// Look up a stock by id.
    pub fn get_by_id(&self, id: &str) -> Result<Option<TrackedStock>> {
        Ok(self.stocks_read()?.get(id).cloned())
    }

    /// Look up a stock by symbol, case-insensitively.
    pub fn get_by_symbol(&self, symbol: &str) -> Result<Option<TrackedStock>> {
        let stocks = self.stocks_read()?;
        Ok(stocks
            .values()
            .find(|s| s.symbol.eq_ignore_ascii_case(symbol.trim()))
            .cloned())
    }

    /// Admit a new stock, generating its id and creation timestamp.
    ///
    /// The symbol is stored upper-case. Fails with
    /// [`Error::ConstraintViolation`] when a case-insensitive match already
    /// exists; callers check first, but the store guards the invariant too.
    pub fn add(&self, new_stock: NewTrackedStock) -> Result<TrackedStock> {
        let symbol = new_stock.symbol.trim().to_uppercase();
        let mut stocks = self.stocks_write()?;

        if stocks.values().any(|s| s.symbol.eq_ignore_ascii_case(&symbol)) {
            return Err(Error::ConstraintViolation(format!(
                "{} is already in the watchlist",
                symbol
            )));
        }

        let stock = TrackedStock {
            id: Uuid::new_v4().to_string(),
            symbol,
            company_name: new_stock.company_name,
            current_price: new_stock.current_price,
            change_amount: new_stock.change_amount,
            change_percent: new_stock.change_percent,
            added_at: Utc::now(),
        };
        stocks.insert(stock.id.clone(), stock.clone());
        Ok(stock)
    }

    /// Merge the provided fields into an existing stock.
    ///
    /// An absent id is a no-op returning `Ok(None)`.
    pub fn update(&self, id: &str, changes: TrackedStockUpdate) -> Result<Option<TrackedStock>> {
        let mut stocks = self.stocks_write()?;
        let Some(stock) = stocks.get_mut(id) else {
            return Ok(None);
        };

        if let Some(price) = changes.current_price {
            stock.current_price = price;
        }
        if let Some(amount) = changes.change_amount {
            stock.change_amount = amount;
        }
        if let Some(percent) = changes.change_percent {
            stock.change_percent = percent;
        }
        Ok(Some(stock.clone()))
    }

    /// Remove a stock and purge all of its sample points.
    ///
    /// Idempotent: removing an unknown id returns `Ok(false)`.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let removed = self.stocks_write()?.remove(id).is_some();
        if removed {
            self.samples_write()?.remove(id);
        }
        Ok(removed)
    }

    /// Replace the stored samples for one (stock, period) pair.
    pub fn replace_samples(
        &self,
        stock_id: &str,
        period: Period,
        points: Vec<SamplePoint>,
    ) -> Result<()> {
        let mut samples = self.samples_write()?;
        let entry = samples.entry(stock_id.to_string()).or_default();
        entry.retain(|p| p.period != period);
        entry.extend(points.into_iter().filter(|p| p.period == period));
        Ok(())
    }

    /// Stored samples for one (stock, period) pair, ascending by timestamp.
    pub fn samples(&self, stock_id: &str, period: Period) -> Result<Vec<SamplePoint>> {
        let samples = self.samples_read()?;
        let mut points: Vec<SamplePoint> = samples
            .get(stock_id)
            .map(|all| all.iter().filter(|p| p.period == period).cloned().collect())
            .unwrap_or_default();
        points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(points)
    }

    /// Aggregate statistics, computed fresh from the current records.
    pub fn stats(&self) -> Result<WatchlistStats> {
        let stocks = self.stocks_read()?;
        let gainers = stocks
            .values()
            .filter(|s| s.change_percent > Decimal::ZERO)
            .count() as i64;
        let losers = stocks
            .values()
            .filter(|s| s.change_percent < Decimal::ZERO)
            .count() as i64;

        Ok(WatchlistStats {
            total_stocks: stocks.len() as i64,
            gainers,
            losers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    fn new_stock(symbol: &str, change_percent: Decimal) -> NewTrackedStock {
        NewTrackedStock {
            symbol: symbol.to_string(),
            company_name: format!("{} Inc", symbol),
            current_price: dec!(100),
            change_amount: dec!(1),
            change_percent,
        }
    }

    #[test]
    fn test_add_stores_symbol_upper_case() {
        let store = WatchlistStore::new();
        let stock = store.add(new_stock("aapl", dec!(1))).unwrap();
        assert_eq!(stock.symbol, "AAPL");
        assert!(!stock.id.is_empty());

        assert_eq!(store.get_by_id(&stock.id).unwrap(), Some(stock));
        assert_eq!(store.get_by_id("missing").unwrap(), None);
    }

    #[test]
    fn test_add_rejects_case_insensitive_duplicate() {
        let store = WatchlistStore::new();
        store.add(new_stock("AAPL", dec!(1))).unwrap();

        let err = store.add(new_stock("aapl", dec!(1))).unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));

        // The failed add must not have touched the store
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_list_orders_most_recent_first() {
        let store = WatchlistStore::new();
        let first = store.add(new_stock("AAPL", dec!(1))).unwrap();
        let second = store.add(new_stock("MSFT", dec!(1))).unwrap();
        let third = store.add(new_stock("GOOG", dec!(1))).unwrap();
        assert!(first.added_at <= second.added_at && second.added_at <= third.added_at);

        let listed = store.list().unwrap();
        let symbols: Vec<&str> = listed.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["GOOG", "MSFT", "AAPL"]);
    }

    #[test]
    fn test_get_by_symbol_is_case_insensitive() {
        let store = WatchlistStore::new();
        store.add(new_stock("AAPL", dec!(1))).unwrap();

        assert!(store.get_by_symbol("aapl").unwrap().is_some());
        assert!(store.get_by_symbol("AaPl").unwrap().is_some());
        assert!(store.get_by_symbol("MSFT").unwrap().is_none());
    }

    #[test]
    fn test_update_merges_partial_fields() {
        let store = WatchlistStore::new();
        let stock = store.add(new_stock("AAPL", dec!(1))).unwrap();

        let updated = store
            .update(
                &stock.id,
                TrackedStockUpdate {
                    current_price: Some(dec!(175.5)),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.current_price, dec!(175.5));
        assert_eq!(updated.change_amount, dec!(1));
        assert_eq!(updated.company_name, "AAPL Inc");
    }

    #[test]
    fn test_update_unknown_id_is_none() {
        let store = WatchlistStore::new();
        let result = store.update("missing", TrackedStockUpdate::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = WatchlistStore::new();
        let stock = store.add(new_stock("AAPL", dec!(1))).unwrap();

        assert!(store.remove(&stock.id).unwrap());
        assert!(!store.remove(&stock.id).unwrap());
    }

    #[test]
    fn test_remove_purges_samples() {
        let store = WatchlistStore::new();
        let stock = store.add(new_stock("AAPL", dec!(1))).unwrap();
        store
            .replace_samples(
                &stock.id,
                Period::OneDay,
                vec![SamplePoint {
                    timestamp: Utc::now(),
                    price: dec!(100),
                    period: Period::OneDay,
                }],
            )
            .unwrap();
        assert_eq!(store.samples(&stock.id, Period::OneDay).unwrap().len(), 1);

        store.remove(&stock.id).unwrap();
        assert!(store.samples(&stock.id, Period::OneDay).unwrap().is_empty());
    }

    #[test]
    fn test_samples_ascending_and_scoped_to_period() {
        let store = WatchlistStore::new();
        let stock = store.add(new_stock("AAPL", dec!(1))).unwrap();
        let now = Utc::now();

        store
            .replace_samples(
                &stock.id,
                Period::OneDay,
                vec![
                    SamplePoint {
                        timestamp: now,
                        price: dec!(102),
                        period: Period::OneDay,
                    },
                    SamplePoint {
                        timestamp: now - Duration::hours(2),
                        price: dec!(100),
                        period: Period::OneDay,
                    },
                ],
            )
            .unwrap();
        store
            .replace_samples(
                &stock.id,
                Period::OneWeek,
                vec![SamplePoint {
                    timestamp: now - Duration::days(3),
                    price: dec!(90),
                    period: Period::OneWeek,
                }],
            )
            .unwrap();

        let day = store.samples(&stock.id, Period::OneDay).unwrap();
        assert_eq!(day.len(), 2);
        assert!(day[0].timestamp < day[1].timestamp);

        let week = store.samples(&stock.id, Period::OneWeek).unwrap();
        assert_eq!(week.len(), 1);
        assert_eq!(week[0].price, dec!(90));
    }

    #[test]
    fn test_replace_samples_overwrites_period_bucket() {
        let store = WatchlistStore::new();
        let stock = store.add(new_stock("AAPL", dec!(1))).unwrap();
        let point = |price| SamplePoint {
            timestamp: Utc::now(),
            price,
            period: Period::OneDay,
        };

        store
            .replace_samples(&stock.id, Period::OneDay, vec![point(dec!(1)), point(dec!(2))])
            .unwrap();
        store
            .replace_samples(&stock.id, Period::OneDay, vec![point(dec!(3))])
            .unwrap();

        let day = store.samples(&stock.id, Period::OneDay).unwrap();
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].price, dec!(3));
    }

    #[test]
    fn test_stats_counts_gainers_and_losers() {
        let store = WatchlistStore::new();
        store.add(new_stock("AAPL", dec!(2.5))).unwrap();
        store.add(new_stock("MSFT", dec!(-1.2))).unwrap();
        store.add(new_stock("GOOG", Decimal::ZERO)).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_stocks, 3);
        assert_eq!(stats.gainers, 1);
        assert_eq!(stats.losers, 1);
        // Flat stocks count in neither bucket
        assert!(stats.gainers + stats.losers <= stats.total_stocks);
        assert_eq!(stats.total_stocks as usize, store.list().unwrap().len());
    }
}
