//! Precious metal prices via Yahoo Finance futures contracts.
//!
//! Metals have no quote API of their own here: a symbol or alias resolves to
//! the corresponding futures ticker (priced per troy ounce) and the lookup
//! rides the stock path, worker pool included.

use std::sync::Arc;

use tracing::warn;

use crate::error::FetchError;

use super::yahoo::YahooFinanceSource;

pub struct MetalsSource {
    yahoo: Arc<YahooFinanceSource>,
}

impl MetalsSource {
    pub fn new(yahoo: Arc<YahooFinanceSource>) -> Self {
        Self { yahoo }
    }

    /// `Ok(None)` for an unknown alias; no upstream call is made in that
    /// case.
    pub async fn latest_price(&self, symbol: &str) -> Result<Option<f64>, FetchError> {
        match futures_ticker(symbol) {
            Some(ticker) => self.yahoo.latest_price(ticker).await,
            None => {
                warn!(symbol, "unknown metal symbol");
                Ok(None)
            }
        }
    }
}

/// Maps a metal symbol or its English alias to the Yahoo Finance futures
/// ticker.
pub(crate) fn futures_ticker(symbol: &str) -> Option<&'static str> {
    match symbol.to_uppercase().as_str() {
        "XAU" | "GOLD" => Some("GC=F"),
        "XAG" | "SILVER" => Some("SI=F"),
        "XPT" | "PLATINUM" => Some("PL=F"),
        "XPD" | "PALLADIUM" => Some("PA=F"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_and_aliases_share_a_ticker() {
        assert_eq!(futures_ticker("XAU"), Some("GC=F"));
        assert_eq!(futures_ticker("gold"), Some("GC=F"));
        assert_eq!(futures_ticker("XAG"), Some("SI=F"));
        assert_eq!(futures_ticker("silver"), Some("SI=F"));
        assert_eq!(futures_ticker("XPT"), Some("PL=F"));
        assert_eq!(futures_ticker("platinum"), Some("PL=F"));
        assert_eq!(futures_ticker("XPD"), Some("PA=F"));
        assert_eq!(futures_ticker("palladium"), Some("PA=F"));
    }

    #[test]
    fn unknown_alias_has_no_ticker() {
        assert_eq!(futures_ticker("COPPER"), None);
        assert_eq!(futures_ticker(""), None);
    }
}
