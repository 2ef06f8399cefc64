//! Configuration for the pricing layer.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::duration::deserialize_ttl;

fn default_coingecko_base_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_quote_currency() -> String {
    "usd".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_quote_workers() -> usize {
    5
}

fn default_crypto_ttl() -> Duration {
    Duration::from_secs(60)
}

fn default_stock_ttl() -> Duration {
    Duration::from_secs(300)
}

fn default_metal_ttl() -> Duration {
    Duration::from_secs(600)
}

/// Settings for upstream price sources and the price cache.
///
/// All fields have defaults, so `PricingConfig::default()` is a working
/// configuration (in-process cache only, public CoinGecko endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Connection string for the external cache tier. Absent means
    /// in-process caching only; an unreachable backend is downgraded to the
    /// same thing with a warning.
    pub redis_url: Option<String>,

    /// Base URL of the CoinGecko-compatible quote API.
    pub coingecko_base_url: String,

    /// Quote currency for all price lookups (lowercase ISO code).
    pub quote_currency: String,

    /// Per-request timeout for upstream HTTP calls. A timeout is reported
    /// as an unknown price, not an error.
    #[serde(deserialize_with = "deserialize_ttl")]
    pub request_timeout: Duration,

    /// How many threads may run the blocking stock-quote library at once.
    /// Further lookups queue until a worker frees up.
    pub quote_workers: usize,

    /// How long a cached crypto price stays fresh.
    #[serde(deserialize_with = "deserialize_ttl")]
    pub crypto_ttl: Duration,

    /// How long a cached stock or ETF price stays fresh.
    #[serde(deserialize_with = "deserialize_ttl")]
    pub stock_ttl: Duration,

    /// How long a cached metal price stays fresh.
    #[serde(deserialize_with = "deserialize_ttl")]
    pub metal_ttl: Duration,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            coingecko_base_url: default_coingecko_base_url(),
            quote_currency: default_quote_currency(),
            request_timeout: default_request_timeout(),
            quote_workers: default_quote_workers(),
            crypto_ttl: default_crypto_ttl(),
            stock_ttl: default_stock_ttl(),
            metal_ttl: default_metal_ttl(),
        }
    }
}

impl PricingConfig {
    /// Config from the process environment. Only `REDIS_URL` is read;
    /// everything else keeps its default.
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            ..Self::default()
        }
    }
}
