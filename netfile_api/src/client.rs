//! HTTP client for the NetFile campaign API.

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    query::{FilerQuery, FilingElementQuery, FilingQuery, Query, TransactionQuery},
    types::{Filer, Filing, FilingElement, Page},
    Error,
};

/// Production base URL.
pub const DEFAULT_BASE_URL: &str = "https://netfile.com/api/campaign";

/// Per-request timeout unless overridden with [`Client::with_timeout`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(7);

/// The four collections this client knows how to page through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Filings,
    FilingElements,
    Filers,
    TransactionElements,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Filings => "/filing/v101/filings",
            Endpoint::FilingElements => "/filing/v101/filing-elements",
            Endpoint::Filers => "/filer/v101/filers",
            Endpoint::TransactionElements => "/cal/v101/transaction-elements",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Endpoint::Filings => "filings",
            Endpoint::FilingElements => "filing-elements",
            Endpoint::Filers => "filers",
            Endpoint::TransactionElements => "transaction-elements",
        };
        f.write_str(name)
    }
}

/// HTTP Basic credentials issued by NetFile.
#[derive(Clone)]
pub struct Credentials {
    key: String,
    secret: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Reads `NETFILE_API_KEY` and `NETFILE_API_SECRET`.
    pub fn from_env() -> Result<Self, Error> {
        let key = non_empty_var("NETFILE_API_KEY")?;
        let secret = non_empty_var("NETFILE_API_SECRET")?;
        Ok(Self { key, secret })
    }
}

fn non_empty_var(name: &'static str) -> Result<String, Error> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::MissingCredential(name)),
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// HTTP client for the NetFile campaign API.
///
/// One `reqwest::Client` is built up front and reused for every page, so
/// connections stay pooled across a long pull. Every request carries Basic
/// auth and the agency ID (`aid`).
pub struct Client {
    base_api_url: String,
    agency_id: String,
    credentials: Credentials,
    http: reqwest::Client,
}

impl Client {
    /// Creates a client pointing at the production API.
    pub fn new(credentials: Credentials, agency_id: &str) -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL, credentials, agency_id)
    }

    /// Creates a client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(
        base_url: &str,
        credentials: Credentials,
        agency_id: &str,
    ) -> Result<Self, Error> {
        Ok(Self {
            base_api_url: base_url.trim_end_matches('/').to_string(),
            agency_id: agency_id.to_string(),
            credentials,
            http: build_http(DEFAULT_TIMEOUT)?,
        })
    }

    /// Replaces the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, Error> {
        self.http = build_http(timeout)?;
        Ok(self)
    }

    pub fn agency_id(&self) -> &str {
        &self.agency_id
    }

    fn get_url(&self, endpoint: Endpoint, query: &impl Query) -> Result<Url, Error> {
        let mut url = Url::parse(&format!("{}{}", self.base_api_url, endpoint.path()))
            .map_err(|e| {
                tracing::error!("Invalid URL constructed: {}", e);
                Error::InvalidUrl(e.to_string())
            })?;
        url.query_pairs_mut().append_pair("aid", &self.agency_id);
        Ok(query.add_to_url(&url))
    }

    /// Fetches one page of any collection, decoding each record as `T`.
    ///
    /// `T = serde_json::Value` keeps records raw, which is what snapshots store.
    pub async fn get_page<T, Q>(&self, query: &Q) -> Result<Page<T>, Error>
    where
        T: DeserializeOwned,
        Q: Query,
    {
        let url = self.get_url(Q::ENDPOINT, query)?;
        tracing::debug!("GET {}", url);
        let resp = self
            .http
            .get(url)
            .basic_auth(&self.credentials.key, Some(&self.credentials.secret))
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to get {}: {}", Q::ENDPOINT, e);
                Error::from(e)
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::from(e)
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        serde_json::from_str::<Page<T>>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::error!("Failed to parse {}: {} | body: {}", Q::ENDPOINT, e, snippet);
            Error::Decode(e.to_string())
        })
    }

    /// Fetches a page of filings.
    pub async fn get_filings(&self, query: &FilingQuery) -> Result<Page<Filing>, Error> {
        self.get_page(query).await
    }

    /// Fetches a page of filing elements.
    pub async fn get_filing_elements(
        &self,
        query: &FilingElementQuery,
    ) -> Result<Page<FilingElement>, Error> {
        self.get_page(query).await
    }

    /// Fetches a page of filers.
    pub async fn get_filers(&self, query: &FilerQuery) -> Result<Page<Filer>, Error> {
        self.get_page(query).await
    }

    /// Fetches a page of CAL transaction elements.
    pub async fn get_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Page<FilingElement>, Error> {
        self.get_page(query).await
    }
}

fn build_http(timeout: Duration) -> Result<reqwest::Client, Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| {
            tracing::error!("Failed to build HTTP client: {}", e);
            Error::Transport(e.to_string())
        })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}
