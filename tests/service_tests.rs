use std::time::Duration;

use pricebook::config::PricingConfig;
use pricebook::prices::{AssetClass, PriceService};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

fn config_for(server: &MockServer) -> PricingConfig {
    PricingConfig {
        coingecko_base_url: server.uri(),
        ..PricingConfig::default()
    }
}

#[tokio::test]
async fn batch_lookup_answers_every_requested_symbol() {
    common::init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("ids", "bitcoin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"bitcoin":{"usd":42000.0}}"#, "application/json"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("ids", "fakecoin999"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let service = PriceService::new(&config_for(&server)).unwrap();
    let symbols = vec!["BTC".to_string(), "FAKECOIN999".to_string()];
    let prices = service.get_multiple_prices_by_type(&symbols, "crypto").await;

    assert_eq!(prices.len(), 2);
    assert_eq!(prices.get("BTC"), Some(&Some(42000.0)));
    assert_eq!(prices.get("FAKECOIN999"), Some(&None));
}

#[tokio::test]
async fn unknown_metal_alias_is_absent_without_touching_upstream() {
    common::init_logging();
    let service = PriceService::new(&PricingConfig::default()).unwrap();
    assert_eq!(service.get_price_by_type("WOLFRAM", "metals").await, None);
}

#[tokio::test]
async fn legacy_crypto_entry_points_still_work() {
    common::init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("ids", "litecoin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"litecoin":{"usd":85.5}}"#, "application/json"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("ids", "dogecoin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"dogecoin":{"usd":0.12}}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let service = PriceService::new(&config_for(&server)).unwrap();
    assert_eq!(service.price("LTC").await, Some(85.5));

    let prices = service
        .prices(&["LTC".to_string(), "DOGE".to_string()])
        .await;
    assert_eq!(prices.get("LTC"), Some(&Some(85.5)));
    assert_eq!(prices.get("DOGE"), Some(&Some(0.12)));
}

#[tokio::test]
async fn symbols_are_normalized_to_uppercase_cache_keys() {
    common::init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("ids", "bitcoin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"bitcoin":{"usd":42000.0}}"#, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let service = PriceService::new(&config_for(&server)).unwrap();
    assert_eq!(service.get_price_by_type("btc", "crypto").await, Some(42000.0));
    // Same asset under a different case shares the cache entry.
    assert_eq!(service.get_price_by_type("BTC", "crypto").await, Some(42000.0));
}

#[tokio::test]
async fn clear_cache_forces_a_refetch() {
    common::init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("ids", "bitcoin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"bitcoin":{"usd":42000.0}}"#, "application/json"),
        )
        .expect(2)
        .mount(&server)
        .await;

    let service = PriceService::new(&config_for(&server)).unwrap();
    assert_eq!(service.get_price_by_type("BTC", "crypto").await, Some(42000.0));
    service.clear_cache().await;
    assert_eq!(service.get_price_by_type("BTC", "crypto").await, Some(42000.0));
}

#[test]
fn unknown_classes_fall_back_to_stocks() {
    common::init_logging();
    assert_eq!(AssetClass::parse("etf"), AssetClass::Etf);
    assert_eq!(AssetClass::parse("stocks"), AssetClass::Stocks);
    assert_eq!(AssetClass::parse("real_estate"), AssetClass::Stocks);
}

#[tokio::test]
async fn zero_price_is_a_real_answer() {
    common::init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("ids", "tether"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"tether":{"usd":0.0}}"#, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let service = PriceService::new(&config_for(&server)).unwrap();
    assert_eq!(service.get_price_by_type("USDT", "crypto").await, Some(0.0));
    // Zero is cached like any other price.
    assert_eq!(service.get_price_by_type("USDT", "crypto").await, Some(0.0));
}

#[tokio::test]
async fn cached_entries_are_namespaced_per_asset_class() {
    common::init_logging();
    let service = PriceService::new(&PricingConfig::default()).unwrap();
    service
        .cache()
        .set("crypto_GOLD_usd", 1.23, Duration::from_secs(60))
        .await;

    // A metal lookup for the same symbol must not see the crypto entry.
    assert_eq!(
        service.cache().get("metal_GOLD", Duration::from_secs(600)).await,
        None
    );
}
