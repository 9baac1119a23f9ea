//! Error types for the API client.

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request never produced a response (DNS, connect, TLS, reset).
    #[error("Request failed: {0}")]
    Transport(String),
    /// The per-request timeout elapsed.
    #[error("Request timed out")]
    Timeout,
    /// The API returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The response body was not the JSON shape we expected.
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// A required credential environment variable is unset or empty.
    #[error("Missing credential: {0} is not set")]
    MissingCredential(&'static str),
}

impl Error {
    /// Whether a retry of the same request has a reasonable chance of succeeding.
    ///
    /// Network failures, timeouts, 429 and 5xx are transient. Everything else
    /// (auth failures, bad queries, undecodable bodies) will fail the same way again.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            Self::Decode(_) | Self::InvalidUrl(_) | Self::MissingCredential(_) => false,
        }
    }

    /// Whether the server refused the combination of query parameters.
    ///
    /// NetFile answers 400 (older deployments 422) when `parts=All` is combined
    /// with filters it cannot expand.
    pub fn is_rejected_query(&self) -> bool {
        matches!(self, Self::HttpStatus { status: 400 | 422, .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout
        } else if e.is_decode() {
            Error::Decode(e.to_string())
        } else {
            Error::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_and_throttling_are_transient() {
        assert!(Error::HttpStatus { status: 500, body: String::new() }.is_transient());
        assert!(Error::HttpStatus { status: 503, body: String::new() }.is_transient());
        assert!(Error::HttpStatus { status: 429, body: String::new() }.is_transient());
        assert!(Error::Timeout.is_transient());
        assert!(Error::Transport("connection reset".into()).is_transient());
    }

    #[test]
    fn client_errors_are_not_transient() {
        assert!(!Error::HttpStatus { status: 400, body: String::new() }.is_transient());
        assert!(!Error::HttpStatus { status: 401, body: String::new() }.is_transient());
        assert!(!Error::Decode("eof".into()).is_transient());
    }

    #[test]
    fn rejected_query_is_400_or_422_only() {
        assert!(Error::HttpStatus { status: 400, body: String::new() }.is_rejected_query());
        assert!(Error::HttpStatus { status: 422, body: String::new() }.is_rejected_query());
        assert!(!Error::HttpStatus { status: 404, body: String::new() }.is_rejected_query());
        assert!(!Error::Timeout.is_rejected_query());
    }
}
