use shared::error::FailureKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("location identifier must be a non-empty path segment")]
    InvalidIdentifier,
    #[error("invalid request url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("{url} returned HTTP {status}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub(crate) fn from_transport(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Request {
                url: url.to_string(),
                source,
            }
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidIdentifier | Self::InvalidUrl { .. } => FailureKind::InvalidInput,
            Self::Request { .. } => FailureKind::Network,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::Status { status: 404, .. } => FailureKind::NotFound,
            Self::Status { .. } => FailureKind::Status,
            Self::Decode { .. } => FailureKind::Decode,
        }
    }

    /// The HTTP status, for failures that got as far as a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
