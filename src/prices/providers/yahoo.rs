//! Stock and ETF quotes via the blocking Yahoo Finance client.
//!
//! The quote library is synchronous, so every fetch runs under
//! `spawn_blocking`, gated by a semaphore that bounds how many quote calls
//! can occupy blocking threads at once. A burst of lookups queues on the
//! semaphore instead of growing the thread count.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task;
use tracing::debug;
use yahoo_finance_api as yahoo;

use crate::error::FetchError;

pub struct YahooFinanceSource {
    pool: Arc<Semaphore>,
}

impl YahooFinanceSource {
    pub fn new(workers: usize) -> Self {
        Self {
            pool: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Last trade price when the market has one, otherwise the most recent
    /// daily close. `Ok(None)` when the symbol has no quotes at all.
    pub async fn latest_price(&self, symbol: &str) -> Result<Option<f64>, FetchError> {
        let permit = self
            .pool
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| FetchError::PoolClosed)?;
        let symbol = symbol.to_uppercase();

        task::spawn_blocking(move || {
            let _permit = permit;
            fetch_blocking(&symbol)
        })
        .await?
    }
}

fn fetch_blocking(symbol: &str) -> Result<Option<f64>, FetchError> {
    let connector = yahoo::YahooConnector::new()?;

    match connector
        .get_latest_quotes(symbol, "1d")
        .and_then(|response| response.last_quote())
    {
        Ok(quote) => {
            if let Some(price) = tradeable_close(quote.close) {
                return Ok(Some(price));
            }
            debug!(symbol, "non-positive last trade price, trying daily close");
        }
        Err(error) => debug!(symbol, %error, "no last trade price, trying daily close"),
    }

    let response = connector.get_quote_range(symbol, "1d", "5d")?;
    match response.quotes() {
        Ok(quotes) => Ok(quotes.last().map(|quote| quote.close)),
        Err(yahoo::YahooError::NoResult | yahoo::YahooError::NoQuotes) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Symbols with no trades yet report a zero close; that is an absent price,
/// not a price of zero.
fn tradeable_close(close: f64) -> Option<f64> {
    (close > 0.0).then_some(close)
}
