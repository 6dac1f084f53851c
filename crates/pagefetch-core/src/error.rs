//! Fetch error type and its coarse classification.
//!
//! Retries are left to callers; [`FetchError::kind`] gives them a stable
//! category to key a retry policy on.

use std::time::Duration;
use thiserror::Error;

/// Error returned by a fetch. Encoding-name problems never show up here:
/// they degrade to the previous encoding instead.
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL, timeout or proxy descriptor rejected before any I/O.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration could not be turned into a fetcher.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Response headers did not arrive in time; the transfer was aborted.
    #[error("no response headers within {}ms", .0.as_millis())]
    Timeout(Duration),

    /// libcurl reported a failure (refused, DNS, TLS, reset, ...).
    #[error("network error: {0}")]
    Network(#[source] curl::Error),

    /// Final response status was outside 2xx.
    #[error("GET {url} returned HTTP {status}")]
    Http { status: u32, url: String },

    /// Body was declared gzip but did not decompress.
    #[error("failed to decompress gzip body: {0}")]
    Decode(#[source] std::io::Error),

    /// Transfer thread went away without reporting a result.
    #[error("transfer worker exited without a result")]
    WorkerLost,
}

/// High-level classification of a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Response headers not received in time.
    Timeout,
    /// Connection, DNS, TLS or HTTP status failure.
    Network,
    /// Body decompression failure.
    Decode,
    /// Rejected before any I/O (request or configuration).
    InvalidInput,
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Timeout(_) => ErrorKind::Timeout,
            FetchError::Network(e) => classify_curl_error(e),
            FetchError::Http { .. } | FetchError::WorkerLost => ErrorKind::Network,
            FetchError::Decode(_) => ErrorKind::Decode,
            FetchError::InvalidRequest(_) | FetchError::InvalidConfig(_) => ErrorKind::InvalidInput,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        FetchError::Network(e)
    }
}

/// Classify a curl error. libcurl's own timeout only fires if a caller set one
/// on the handle; it is still reported as a timeout.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_url_malformed() || e.is_unsupported_protocol() {
        return ErrorKind::InvalidInput;
    }
    ErrorKind::Network
}
