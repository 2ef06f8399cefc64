//! Unified price lookup across asset classes.
//!
//! `PriceService` is the single entry point route handlers talk to. It owns
//! the cache and the upstream sources, dispatches by [`AssetClass`], and
//! converts every upstream failure into an absent price.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::error;

use crate::config::PricingConfig;
use crate::error::FetchError;

use super::cache::PriceCache;
use super::providers::{CoinGeckoSource, MetalsSource, YahooFinanceSource};

/// Asset class of a portfolio position. Decides which upstream source a
/// symbol is routed to and how long its price stays cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetClass {
    Crypto,
    Stocks,
    Etf,
    Metals,
}

impl AssetClass {
    /// Permissive parse of the portfolio-type strings stored with user
    /// portfolios. Anything unrecognized is priced like a stock.
    pub fn parse(portfolio_type: &str) -> Self {
        match portfolio_type.to_lowercase().as_str() {
            "crypto" => AssetClass::Crypto,
            "stocks" => AssetClass::Stocks,
            "etf" => AssetClass::Etf,
            "metals" => AssetClass::Metals,
            _ => AssetClass::Stocks,
        }
    }
}

pub struct PriceService {
    cache: Arc<PriceCache>,
    coingecko: CoinGeckoSource,
    yahoo: Arc<YahooFinanceSource>,
    metals: MetalsSource,
    quote_currency: String,
    crypto_ttl: Duration,
    stock_ttl: Duration,
    metal_ttl: Duration,
}

impl PriceService {
    /// Service with an in-process cache only. Does not touch the network.
    pub fn new(config: &PricingConfig) -> Result<Self, FetchError> {
        Self::with_cache(config, Arc::new(PriceCache::in_memory()))
    }

    /// Service with the external cache tier when `config.redis_url` is set
    /// and reachable; silently degrades to the in-process tier otherwise.
    pub async fn connect(config: &PricingConfig) -> Result<Self, FetchError> {
        let cache = Arc::new(PriceCache::connect(config.redis_url.as_deref()).await);
        Self::with_cache(config, cache)
    }

    /// Service over a caller-provided cache (dependency injection for
    /// tests and embedders that share a cache between services).
    pub fn with_cache(config: &PricingConfig, cache: Arc<PriceCache>) -> Result<Self, FetchError> {
        let yahoo = Arc::new(YahooFinanceSource::new(config.quote_workers));
        Ok(Self {
            cache,
            coingecko: CoinGeckoSource::new(config)?,
            metals: MetalsSource::new(yahoo.clone()),
            yahoo,
            quote_currency: config.quote_currency.to_lowercase(),
            crypto_ttl: config.crypto_ttl,
            stock_ttl: config.stock_ttl,
            metal_ttl: config.metal_ttl,
        })
    }

    /// The cache backing this service, exposed so operational surfaces can
    /// pre-seed or inspect it.
    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }

    fn ttl_for(&self, class: AssetClass) -> Duration {
        match class {
            AssetClass::Crypto => self.crypto_ttl,
            AssetClass::Stocks | AssetClass::Etf => self.stock_ttl,
            AssetClass::Metals => self.metal_ttl,
        }
    }

    /// Price for one symbol of the given portfolio type. `None` means the
    /// price is unknown right now; it is never an error.
    pub async fn get_price_by_type(&self, symbol: &str, portfolio_type: &str) -> Option<f64> {
        self.get_price(symbol, AssetClass::parse(portfolio_type)).await
    }

    pub async fn get_price(&self, symbol: &str, class: AssetClass) -> Option<f64> {
        match class {
            AssetClass::Crypto => self.crypto_price(symbol).await,
            AssetClass::Stocks | AssetClass::Etf => self.stock_price(symbol).await,
            AssetClass::Metals => self.metal_price(symbol).await,
        }
    }

    /// Resolves all symbols concurrently. The result maps every requested
    /// symbol exactly once; a failed lookup maps to `None` and does not
    /// affect the others.
    pub async fn get_multiple_prices_by_type(
        &self,
        symbols: &[String],
        portfolio_type: &str,
    ) -> HashMap<String, Option<f64>> {
        let class = AssetClass::parse(portfolio_type);
        let lookups = symbols.iter().map(|symbol| async move {
            (symbol.clone(), self.get_price(symbol, class).await)
        });
        join_all(lookups).await.into_iter().collect()
    }

    /// Crypto price on a past calendar date, in the configured quote
    /// currency. Uncached; every call hits upstream.
    pub async fn historical_price(&self, symbol: &str, date: NaiveDate) -> Option<f64> {
        match self.coingecko.historical_price(symbol, date).await {
            Ok(price) => price,
            Err(e) => {
                error!(%symbol, %date, error = %e, "historical price fetch failed");
                None
            }
        }
    }

    /// Legacy crypto-only lookup, kept for parity with the original HTTP
    /// surface. Equivalent to `get_price(symbol, AssetClass::Crypto)`.
    pub async fn price(&self, symbol: &str) -> Option<f64> {
        self.crypto_price(symbol).await
    }

    /// Legacy crypto-only batch lookup.
    pub async fn prices(&self, symbols: &[String]) -> HashMap<String, Option<f64>> {
        let lookups = symbols
            .iter()
            .map(|symbol| async move { (symbol.clone(), self.crypto_price(symbol).await) });
        join_all(lookups).await.into_iter().collect()
    }

    /// Drop every cached price, in both tiers.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    async fn crypto_price(&self, symbol: &str) -> Option<f64> {
        let symbol = symbol.to_uppercase();
        let key = format!("crypto_{}_{}", symbol, self.quote_currency);
        let ttl = self.ttl_for(AssetClass::Crypto);

        if let Some(price) = self.cache.get(&key, ttl).await {
            return Some(price);
        }

        match self.coingecko.latest_price(&symbol).await {
            Ok(Some(price)) => {
                self.cache.set(&key, price, ttl).await;
                Some(price)
            }
            Ok(None) => None,
            Err(e) => {
                error!(%symbol, error = %e, "crypto price fetch failed");
                None
            }
        }
    }

    async fn stock_price(&self, symbol: &str) -> Option<f64> {
        let symbol = symbol.to_uppercase();
        let key = format!("stock_{symbol}");
        let ttl = self.ttl_for(AssetClass::Stocks);

        if let Some(price) = self.cache.get(&key, ttl).await {
            return Some(price);
        }

        match self.yahoo.latest_price(&symbol).await {
            Ok(Some(price)) => {
                self.cache.set(&key, price, ttl).await;
                Some(price)
            }
            Ok(None) => None,
            Err(e) => {
                error!(%symbol, error = %e, "stock price fetch failed");
                None
            }
        }
    }

    async fn metal_price(&self, symbol: &str) -> Option<f64> {
        let symbol = symbol.to_uppercase();
        let key = format!("metal_{symbol}");
        let ttl = self.ttl_for(AssetClass::Metals);

        if let Some(price) = self.cache.get(&key, ttl).await {
            return Some(price);
        }

        match self.metals.latest_price(&symbol).await {
            Ok(Some(price)) => {
                self.cache.set(&key, price, ttl).await;
                Some(price)
            }
            Ok(None) => None,
            Err(e) => {
                error!(%symbol, error = %e, "metal price fetch failed");
                None
            }
        }
    }
}
