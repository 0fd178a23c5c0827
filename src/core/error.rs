// Centralized error handling for the browser

use reqwest::StatusCode;
use thiserror::Error;

/// Underlying cause of a failed call to the user service.
/// Kept for logging only; callers see the `GatewayError` message.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connect failure, timeout, or an unreadable body
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server responded with status {0}")]
    Status(StatusCode),

    #[error("server rejected the request: {0}")]
    Rejected(String),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Request(e) if e.is_timeout())
    }
}

/// Errors surfaced by the remote collection gateway.
///
/// The `Display` text is fixed and safe to show to an operator.
/// The transport cause is available through `source()`.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Failed to fetch {subject}")]
    Fetch {
        subject: &'static str,
        #[source]
        source: TransportError,
    },

    #[error("User not found")]
    NotFound {
        #[source]
        source: TransportError,
    },

    #[error("Failed to search users")]
    Search(#[source] TransportError),

    #[error("Failed to load users from external API")]
    Load(#[source] TransportError),

    #[error("Failed to get data status")]
    Status(#[source] TransportError),
}

impl GatewayError {
    pub fn fetch_all(source: TransportError) -> Self {
        GatewayError::Fetch {
            subject: "users",
            source,
        }
    }

    pub fn fetch_one(source: TransportError) -> Self {
        if matches!(source, TransportError::Status(code) if code == StatusCode::NOT_FOUND) {
            GatewayError::NotFound { source }
        } else {
            GatewayError::Fetch {
                subject: "user",
                source,
            }
        }
    }

    pub fn cause(&self) -> &TransportError {
        match self {
            GatewayError::Fetch { source, .. } => source,
            GatewayError::NotFound { source } => source,
            GatewayError::Search(source) => source,
            GatewayError::Load(source) => source,
            GatewayError::Status(source) => source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound { .. })
    }
}
