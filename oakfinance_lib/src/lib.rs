//! Library layer for the Oakland campaign-finance pipeline.
//!
//! Pulls filings, filing elements and filers from the NetFile API through a
//! retrying paginated fetcher, normalizes them into flat records, and joins
//! them against locally maintained candidate reference data to produce the
//! published contribution and expenditure record sets.

pub mod config;
pub mod dates;
pub mod error;
pub mod export;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod reference;
pub mod snapshot;
pub mod summary;

pub use netfile_api;
pub use netfile_api::types;

pub use config::Settings;
pub use error::OakFinanceError;
pub use fetch::{FetchError, FetchSummary, PageSource, PaginatedFetcher, RetryPolicy};
pub use normalize::{Diagnostics, RegionRule};
pub use pipeline::{ElementScope, RawCollections, ReferenceTables};
pub use reconcile::{build_output, ContributionRow, ExpenditureRow, JoinStats};
