//! Paginated retrieval against the NetFile API.
//!
//! [`PaginatedFetcher`] walks an offset [`Cursor`] to completion, retrying
//! transient failures under a [`RetryPolicy`] and counting every outcome in a
//! [`FetchTracker`]. Requests are strictly sequential.

mod cursor;
mod fetcher;
mod retry;

pub use cursor::{next_cursor, Cursor, PageMeta};
pub use fetcher::{PageSource, PaginatedFetcher};
pub use retry::{with_retry, FetchSummary, FetchTracker, RetryPolicy};

use netfile_api::Endpoint;

/// A pull that could not be completed. Partial results are discarded.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("{endpoint}: gave up after {attempts} attempts: {last}")]
    Exhausted {
        endpoint: Endpoint,
        attempts: u32,
        #[source]
        last: netfile_api::Error,
    },
    #[error("{endpoint}: query rejected: {source}")]
    Rejected {
        endpoint: Endpoint,
        source: netfile_api::Error,
    },
    #[error("{endpoint}: {source}")]
    Api {
        endpoint: Endpoint,
        source: netfile_api::Error,
    },
    #[error("{endpoint}: undecodable response: {reason}")]
    Decode { endpoint: Endpoint, reason: String },
}
