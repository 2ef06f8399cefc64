mod cache;
pub mod providers;
mod redis_store;
mod service;

pub use cache::{CacheStore, PriceCache};
pub use redis_store::RedisStore;
pub use service::{AssetClass, PriceService};
