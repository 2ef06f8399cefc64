//! Error types for upstream price fetches.

use thiserror::Error;

/// Failure while talking to an upstream quote source.
///
/// These never escape [`crate::prices::PriceService`]: the service logs the
/// error and reports the price as unknown.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    UpstreamStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("quote library error: {0}")]
    Quotes(#[from] yahoo_finance_api::YahooError),

    #[error("blocking fetch did not complete: {0}")]
    Pool(#[from] tokio::task::JoinError),

    /// Acquiring a worker permit reports closure as an error. Nothing
    /// closes the pool's semaphore today, but the lookup path still has to
    /// turn that case into an error rather than panic.
    #[error("worker pool is shut down")]
    PoolClosed,
}
