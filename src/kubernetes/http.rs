//! HTTP utilities for Kubernetes REST API calls

use async_trait::async_trait;
use reqwest::{Client, Request, Response};

use super::error::{Error, TransportError};

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Anything that can perform one HTTP exchange.
///
/// Implementations must not hold per-call mutable state; one executor is
/// shared by every call a client makes.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Send `request` and return the response head. The body is left unread.
    async fn execute(&self, request: &Request) -> Result<Response, TransportError>;
}

#[async_trait]
impl RequestExecutor for Client {
    async fn execute(&self, request: &Request) -> Result<Response, TransportError> {
        let owned = clone_request(request)?;
        Ok(Client::execute(self, owned).await?)
    }
}

#[async_trait]
impl<T: RequestExecutor + ?Sized> RequestExecutor for std::sync::Arc<T> {
    async fn execute(&self, request: &Request) -> Result<Response, TransportError> {
        (**self).execute(request).await
    }
}

/// Return an independent copy of `request`.
///
/// Method, URL, version and timeout are copied; the header map is cloned
/// entry by entry so the copy shares no mutable state with the original.
/// Buffered bodies are copied. Streaming bodies cannot be replayed and
/// yield [`TransportError::UncloneableBody`].
pub fn clone_request(request: &Request) -> Result<Request, TransportError> {
    request.try_clone().ok_or(TransportError::UncloneableBody)
}

/// Build the pooled client every [`KubeClient`](super::client::KubeClient)
/// sends through.
pub fn build_http_client() -> Result<Client, Error> {
    Client::builder()
        .user_agent(concat!("gke-pods/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(Error::HttpClient)
}

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Format a client error for display on the command line
/// Security: remote bodies are never echoed, only the status is interpreted
pub fn format_kube_error(error: &Error) -> String {
    match error {
        Error::Status { status, .. } => match status.as_u16() {
            401 => "Authentication failed. Check the configured username and password.".to_string(),
            403 => "Permission denied. The user is not allowed to list pods.".to_string(),
            404 => "API path not found. Check the base URL of the cluster.".to_string(),
            429 => "Rate limit exceeded. Please try again later.".to_string(),
            500..=599 => "Kubernetes API temporarily unavailable. Please try again.".to_string(),
            code => format!("Request failed with HTTP status {code}."),
        },
        Error::Cancelled { reason, .. } => format!("Request aborted: {reason}."),
        Error::Transport { .. } => {
            "Could not reach the Kubernetes API. Check your network connection and the base URL."
                .to_string()
        }
        Error::InvalidBaseUrl { url, .. } => format!("Invalid base URL {url:?}."),
        Error::Decode(_) => "The API returned a response that is not a pod list.".to_string(),
        other => {
            let text = other.to_string();
            let sanitized: String = text
                .chars()
                .filter(|c| !c.is_control())
                .take(80)
                .collect();
            if sanitized.len() < text.len() {
                format!("{}...", sanitized)
            } else {
                sanitized
            }
        }
    }
}
