//! Message timestamping service
//!
//! A single-route HTTP service: POST a JSON `{"text": ...}` to `/` and get
//! the same message back with the server's UTC receipt time attached.

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// A message and the time the server received it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    pub fn set_timestamp(&mut self) {
        self.timestamp = Some(Utc::now());
    }
}

/// Build the service router
pub fn router() -> Router {
    Router::new()
        .route("/", post(stamp).fallback(method_not_allowed))
        .fallback(not_found)
}

/// Serve the router on an already bound listener until the task is dropped.
pub async fn serve(listener: TcpListener) -> Result<()> {
    let addr = listener.local_addr().context("Failed to read listener address")?;
    tracing::info!("Message service listening on {}", addr);

    axum::serve(listener, router())
        .await
        .context("Message service stopped unexpectedly")
}

async fn stamp(body: Bytes) -> Response {
    // A `null` body is an empty message.
    let mut message = match serde_json::from_slice::<Option<Message>>(&body) {
        Ok(m) => m.unwrap_or_default(),
        Err(e) => {
            tracing::debug!("Rejecting malformed message: {}", e);
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    message.set_timestamp();
    tracing::debug!("Stamped message ({} bytes of text)", message.text.len());

    match serde_json::to_value(&message) {
        Ok(value) => Json(value).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "404 page not found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_is_omitted_until_set() {
        let mut message = Message {
            text: "hello".to_string(),
            timestamp: None,
        };
        assert_eq!(serde_json::to_string(&message).unwrap(), r#"{"text":"hello"}"#);

        let before = Utc::now();
        message.set_timestamp();
        let stamped = message.timestamp.unwrap();
        assert!(stamped >= before);
        assert!(serde_json::to_string(&message).unwrap().contains("\"timestamp\""));
    }

    #[test]
    fn test_missing_text_defaults_to_empty() {
        let message: Message = serde_json::from_str(r#"{"other": 1}"#).unwrap();
        assert_eq!(message.text, "");
        assert!(message.timestamp.is_none());
    }
}
