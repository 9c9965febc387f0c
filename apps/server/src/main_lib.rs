use std::sync::Arc;

use crate::config::Config;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use tickerboard_core::watchlist::{WatchlistService, WatchlistServiceTrait, WatchlistStore};
use tickerboard_market_data::{FinnhubProvider, MarketDataProvider, ProviderChain, YahooProvider};

pub struct AppState {
    pub watchlist_service: Arc<dyn WatchlistServiceTrait>,
}

pub fn init_tracing() {
    let fmt_layer = fmt::layer().json().with_current_span(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let mut providers: Vec<Arc<dyn MarketDataProvider>> = Vec::new();

    // Fixed try order: Finnhub when a credential is configured, Yahoo after.
    match &config.finnhub_api_key {
        Some(key) => providers.push(Arc::new(FinnhubProvider::new(key.clone()))),
        None => tracing::warn!(
            "FINNHUB_API_KEY is not set; serving market data from Yahoo Finance only"
        ),
    }

    match YahooProvider::new() {
        Ok(provider) => providers.push(Arc::new(provider)),
        Err(e) => tracing::warn!("Yahoo Finance provider unavailable: {}", e),
    }

    if providers.is_empty() {
        anyhow::bail!("No market data provider could be constructed");
    }

    let market_data = Arc::new(ProviderChain::new(providers));
    let store = Arc::new(WatchlistStore::new());
    let watchlist_service = Arc::new(WatchlistService::new(store, market_data));

    Ok(Arc::new(AppState { watchlist_service }))
}
