//! Error type shared by every layer of the client.

use crate::address::AddressValidationError;
use crate::options::Options;

/// Generic result of all calls in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while composing, dispatching or polling a request.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Request was rejected locally before hitting the network.
    #[error("Bad request: {message}")]
    BadRequest {
        /// Human-readable reason
        message: String,
        /// Options the request was built from
        options: Box<Options>,
    },
    /// Node answered with a non-2xx status.
    #[error("HTTP {status} {status_text}: {data}")]
    Http {
        /// Response status code
        status: u16,
        /// Canonical reason phrase
        status_text: String,
        /// Response body (JSON if it parses, string otherwise)
        data: serde_json::Value,
    },
    /// Submitted transaction was rejected or reverted.
    #[error("Transaction {hash} failed: {message}")]
    TransactionFailed {
        /// Transaction hash
        hash: String,
        /// Failure reason reported by the node
        message: String,
        /// Execution details
        tx_result: serde_json::Value,
    },
    /// Polling gave up before the predicate was satisfied.
    #[error("until: timeout {timeout_ms} ms exceeded")]
    Timeout {
        /// Configured polling budget
        timeout_ms: u64,
    },
    /// Options point to a node missing from the config.
    #[error("Node {index} is not configured ({count} nodes available)")]
    NodeLookup {
        /// Requested node index
        index: usize,
        /// Number of configured nodes
        count: usize,
    },
    /// Response had an unexpected shape.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
    /// Header name or value cannot be sent over HTTP.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    /// Malformed address.
    #[error(transparent)]
    InvalidAddress(#[from] AddressValidationError),
    /// Connection-level failure.
    #[cfg(feature = "http")]
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    /// JSON (de)serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Malformed node URL.
    #[error(transparent)]
    Url(#[from] url::ParseError),
    /// Config file could not be parsed.
    #[error("Invalid config: {0}")]
    Config(#[from] serde_yaml::Error),
    /// Config file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn status(&self) -> Option<u16> {
        //! HTTP-like status of the error, if it has one.
        //!
        //! Local validation failures report `400` to stay comparable
        //! with errors returned by the node itself.
        match self {
            Self::BadRequest { .. } | Self::TransactionFailed { .. } => Some(400),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        //! Whether polling ran out of time.
        matches!(self, Self::Timeout { .. })
    }

    pub(crate) fn bad_request(message: impl Into<String>, options: &Options) -> Self {
        Self::BadRequest {
            message: message.into(),
            options: Box::new(options.clone()),
        }
    }
}
