//! HTTP Basic Authorization
//!
//! [`BasicAuthTransport`] decorates another [`RequestExecutor`] and attaches
//! `Authorization: Basic ...` to every request it forwards.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Request, Response};

use super::client::Config;
use super::error::TransportError;
use super::http::{clone_request, RequestExecutor};

/// Encode `username:password` as a Basic Authorization header value.
pub fn basic_auth_header(username: &str, password: &str) -> Result<HeaderValue, TransportError> {
    let encoded = STANDARD.encode(format!("{username}:{password}"));
    let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Executor decorator providing HTTP Basic Authorization.
///
/// The caller's request is only borrowed. Credentials go on a private copy
/// made with [`clone_request`], so one transport can serve any number of
/// concurrent calls.
pub struct BasicAuthTransport<E> {
    username: String,
    password: String,
    inner: E,
}

impl<E: RequestExecutor> BasicAuthTransport<E> {
    pub fn new(cfg: &Config, inner: E) -> Self {
        Self {
            username: cfg.username.clone(),
            password: cfg.password.clone(),
            inner,
        }
    }
}

impl<E> std::fmt::Debug for BasicAuthTransport<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuthTransport")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<E: RequestExecutor> RequestExecutor for BasicAuthTransport<E> {
    async fn execute(&self, request: &Request) -> Result<Response, TransportError> {
        let mut authed = clone_request(request)?;
        authed.headers_mut().insert(
            AUTHORIZATION,
            basic_auth_header(&self.username, &self.password)?,
        );

        self.inner.execute(&authed).await
    }
}
