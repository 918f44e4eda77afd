use serde::{Deserialize, Serialize};

/// Coarse classification of a failed query, as surfaced to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidInput,
    Network,
    Timeout,
    NotFound,
    Status,
    Decode,
}

impl FailureKind {
    pub fn describe(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid input",
            Self::Network => "network failure",
            Self::Timeout => "request timed out",
            Self::NotFound => "not found",
            Self::Status => "unexpected HTTP status",
            Self::Decode => "malformed response",
        }
    }
}

/// Error body the API returns alongside non-success statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

impl ApiErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str::<Self>(raw)
            .ok()
            .filter(|body| !body.error.trim().is_empty())
    }
}
