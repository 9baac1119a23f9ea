//! Shared query infrastructure: the [`Query`] trait and [`QueryCommon`] fields.

use url::Url;

use crate::client::Endpoint;

/// Default number of records requested per page. The API caps `limit` at 1000.
pub const DEFAULT_LIMIT: u64 = 1000;

/// Trait implemented by all query builders. Provides URL serialization and
/// shared builder methods for offset pagination and detail expansion.
pub trait Query: Clone {
    /// The route this query is sent to.
    const ENDPOINT: Endpoint;

    /// Name of the foreign-key filter used by [`Query::with_parent_id`].
    const PARENT_PARAM: &'static str;

    /// Appends this query's parameters to the given URL, returning the modified URL.
    fn add_to_url(&self, url: &Url) -> Url;

    /// Returns a mutable reference to the common query fields.
    fn get_common(&mut self) -> &mut QueryCommon;

    /// Returns the common query fields.
    fn common(&self) -> &QueryCommon;

    /// Restricts the query to children of one parent record (e.g. one filing).
    fn with_parent_id(self, parent_id: &str) -> Self;

    /// Sets the zero-based record offset.
    fn with_offset(mut self, offset: u64) -> Self
    where
        Self: Sized,
    {
        self.get_common().offset = offset;
        self
    }

    /// Sets the number of results per page.
    fn with_limit(mut self, limit: u64) -> Self
    where
        Self: Sized,
    {
        self.get_common().limit = limit;
        self
    }

    /// Requests nested detail (`parts=All`).
    fn with_parts(mut self) -> Self
    where
        Self: Sized,
    {
        self.get_common().parts = true;
        self
    }

    /// Drops the `parts=All` expansion flag.
    fn without_parts(mut self) -> Self
    where
        Self: Sized,
    {
        self.get_common().parts = false;
        self
    }
}

/// Fields shared by all query types: offset pagination and detail expansion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryCommon {
    /// Zero-based record offset. Defaults to 0.
    pub offset: u64,
    /// Results per page. Defaults to 1000.
    pub limit: u64,
    /// Whether `parts=All` is sent.
    pub parts: bool,
}

impl Default for QueryCommon {
    fn default() -> QueryCommon {
        QueryCommon {
            offset: 0,
            limit: DEFAULT_LIMIT,
            parts: false,
        }
    }
}

impl QueryCommon {
    /// Appends the offset/limit pair and, if requested, the expansion flag.
    pub fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.query_pairs_mut()
            .append_pair("offset", &self.offset.to_string())
            .append_pair("limit", &self.limit.to_string());
        if self.parts {
            url.query_pairs_mut().append_pair("parts", "All");
        }
        url
    }
}
