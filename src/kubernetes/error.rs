//! Error types for the Kubernetes client.

use reqwest::{Method, StatusCode};
use thiserror::Error;

/// Result alias used throughout the client.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a context stopped a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The context was cancelled explicitly.
    Cancelled,
    /// The context deadline passed.
    DeadlineExceeded,
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancelReason::Cancelled => f.write_str("context canceled"),
            CancelReason::DeadlineExceeded => f.write_str("context deadline exceeded"),
        }
    }
}

/// Failures of a single request executor.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("request body is a stream and cannot be cloned")]
    UncloneableBody,

    #[error("invalid Authorization header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

/// Errors returned by [`KubeClient`](super::client::KubeClient).
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("failed to create request: {method} {url:?}: {source}")]
    BuildRequest {
        method: Method,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{reason}: {method} {url:?}")]
    Cancelled {
        method: Method,
        url: String,
        reason: CancelReason,
    },

    #[error("failed to make request: {method} {url:?}: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to read response body for {url:?}: {source}")]
    ReadBody {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("http error {} {url:?}: {body:?}", .status.as_u16())]
    Status {
        status: StatusCode,
        url: String,
        body: String,
    },

    #[error("failed to decode list of pod resources: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// True when the caller's context stopped the call.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled { .. })
    }

    /// The remote status code, for [`Error::Status`] only.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_mentions_code_url_and_body() {
        let err = Error::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            url: "http://host/api/v1/namespaces/default/pods".to_string(),
            body: "boom".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("boom"));
        assert!(msg.contains("/api/v1/namespaces/default/pods"));
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_cancelled_error_is_distinguishable() {
        let err = Error::Cancelled {
            method: Method::GET,
            url: "http://host/api/v1".to_string(),
            reason: CancelReason::DeadlineExceeded,
        };

        assert!(err.is_cancelled());
        assert_eq!(err.status(), None);
        assert!(err.to_string().starts_with("context deadline exceeded"));
    }
}
