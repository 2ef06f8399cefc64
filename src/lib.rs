//! Asset price retrieval and caching for a personal-finance backend.
//!
//! Route handlers ask [`prices::PriceService`] for a price by symbol and
//! asset class and get back `Option<f64>`: the service routes crypto symbols
//! to CoinGecko, stocks and ETFs to the blocking Yahoo Finance library on a
//! bounded worker pool, and metals to Yahoo futures tickers, fronting all of
//! them with a two-tier TTL cache (Redis with an in-process fallback).
//!
//! A price of `None` always means "unknown right now", never an error;
//! lookup paths do not fail and do not panic.

pub mod clock;
pub mod config;
pub mod duration;
pub mod error;
pub mod prices;
