//! CoinGecko crypto price source.
//!
//! `/simple/price` serves live quotes and `/coins/{id}/history` serves
//! date-scoped prices. Both are free-tier endpoints; rate limits apply.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::config::PricingConfig;
use crate::error::FetchError;

/// Response shape of `/coins/{id}/history`. Coins with no market data for
/// the requested date omit the whole `market_data` object.
#[derive(Debug, Deserialize)]
struct CoinHistoryResponse {
    market_data: Option<HistoryMarketData>,
}

#[derive(Debug, Deserialize)]
struct HistoryMarketData {
    current_price: HashMap<String, f64>,
}

pub struct CoinGeckoSource {
    client: reqwest::Client,
    base_url: String,
    quote_currency: String,
}

impl CoinGeckoSource {
    pub fn new(config: &PricingConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.coingecko_base_url.clone(),
            quote_currency: config.quote_currency.to_lowercase(),
        })
    }

    /// Live quote in the configured currency. `Ok(None)` when the upstream
    /// does not know the coin or the currency.
    pub async fn latest_price(&self, symbol: &str) -> Result<Option<f64>, FetchError> {
        let id = coin_id(symbol);
        let url = format!("{}/simple/price", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("ids", id.as_str()),
                ("vs_currencies", self.quote_currency.as_str()),
            ])
            .header("Accept", "application/json")
            .send()
            .await?;
        let response = check_status(response).await?;

        let data: HashMap<String, HashMap<String, f64>> = response.json().await?;
        let price = data
            .get(&id)
            .and_then(|quotes| quotes.get(&self.quote_currency))
            .copied();

        if price.is_none() {
            debug!(symbol, %id, "coin missing from simple/price response");
        }
        Ok(price)
    }

    /// Price on a past calendar date. Never cached: every call hits
    /// upstream.
    pub async fn historical_price(
        &self,
        symbol: &str,
        date: NaiveDate,
    ) -> Result<Option<f64>, FetchError> {
        let id = coin_id(symbol);
        let date_str = date.format("%d-%m-%Y").to_string();
        let url = format!("{}/coins/{}/history", self.base_url, id);

        let response = self
            .client
            .get(&url)
            .query(&[("date", date_str.as_str()), ("localization", "false")])
            .header("Accept", "application/json")
            .send()
            .await?;
        let response = check_status(response).await?;

        let history: CoinHistoryResponse = response.json().await?;
        Ok(history
            .market_data
            .and_then(|md| md.current_price.get(&self.quote_currency).copied()))
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(FetchError::UpstreamStatus { status, body })
}

/// Maps an exchange symbol to the CoinGecko coin id.
///
/// Unknown symbols pass through lower-cased, which works for coins whose id
/// matches their ticker; anything else comes back absent from the API
/// response and resolves to an unknown price.
pub(crate) fn coin_id(symbol: &str) -> String {
    let id = match symbol.to_uppercase().as_str() {
        "BTC" => "bitcoin",
        "ETH" => "ethereum",
        "USDT" => "tether",
        "BNB" => "binancecoin",
        "SOL" => "solana",
        "XRP" => "ripple",
        "USDC" => "usd-coin",
        "ADA" => "cardano",
        "DOGE" => "dogecoin",
        "TRX" => "tron",
        "TON" => "the-open-network",
        "MATIC" => "matic-network",
        "DOT" => "polkadot",
        "LTC" => "litecoin",
        "AVAX" => "avalanche-2",
        "UNI" => "uniswap",
        "LINK" => "chainlink",
        _ => return symbol.to_lowercase(),
    };
    id.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HISTORY_RESPONSE: &str = r#"{
        "id": "bitcoin",
        "symbol": "btc",
        "name": "Bitcoin",
        "market_data": {
            "current_price": {
                "usd": 42850.12,
                "eur": 39234.56
            },
            "market_cap": {
                "usd": 840123456789
            }
        }
    }"#;

    const SAMPLE_HISTORY_NO_MARKET_DATA: &str = r#"{
        "id": "bitcoin",
        "symbol": "btc",
        "name": "Bitcoin"
    }"#;

    #[test]
    fn parses_history_payload() {
        let response: CoinHistoryResponse = serde_json::from_str(SAMPLE_HISTORY_RESPONSE).unwrap();
        let market_data = response.market_data.expect("should have market data");
        let usd = market_data.current_price.get("usd").expect("usd price");
        assert!((usd - 42850.12).abs() < 0.01);
    }

    #[test]
    fn missing_market_data_is_structural_absence() {
        let response: CoinHistoryResponse =
            serde_json::from_str(SAMPLE_HISTORY_NO_MARKET_DATA).unwrap();
        assert!(response.market_data.is_none());
    }

    #[test]
    fn known_symbols_map_to_coin_ids() {
        assert_eq!(coin_id("BTC"), "bitcoin");
        assert_eq!(coin_id("btc"), "bitcoin");
        assert_eq!(coin_id("ETH"), "ethereum");
        assert_eq!(coin_id("USDC"), "usd-coin");
        assert_eq!(coin_id("TON"), "the-open-network");
        assert_eq!(coin_id("AVAX"), "avalanche-2");
    }

    #[test]
    fn unknown_symbol_passes_through_lowercased() {
        assert_eq!(coin_id("FAKECOIN999"), "fakecoin999");
        assert_eq!(coin_id("NewCoin"), "newcoin");
    }

    #[test]
    fn history_date_format_matches_api() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(date.format("%d-%m-%Y").to_string(), "15-01-2024");
    }
}
