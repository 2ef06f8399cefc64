pub mod coingecko;
pub mod metals;
pub mod yahoo;

pub use coingecko::CoinGeckoSource;
pub use metals::MetalsSource;
pub use yahoo::YahooFinanceSource;
