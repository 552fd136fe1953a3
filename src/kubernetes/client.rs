//! Kubernetes Client
//!
//! Main client for the Kubernetes master, combining Basic authentication
//! and the HTTP executor.

use std::sync::Arc;

use reqwest::{Method, Request, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::api::{Pod, PodList};
use super::auth::BasicAuthTransport;
use super::context::Context;
use super::error::{Error, Result};
use super::http::{build_http_client, sanitize_for_log, RequestExecutor};

/// Base path for Kubernetes API resources.
pub const API_ENDPOINT: &str = "/api/v1";

/// Collection listed by [`KubeClient::list_pods`].
const DEFAULT_PODS: &str = "/namespaces/default/pods";

/// Kubernetes API client configuration.
#[derive(Clone, Default)]
pub struct Config {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Client for the Kubernetes master.
#[derive(Clone)]
pub struct KubeClient {
    endpoint_url: String,
    http: Arc<dyn RequestExecutor>,
}

impl KubeClient {
    /// Create a client sending through a pooled `reqwest` client.
    pub fn new(cfg: &Config) -> Result<Self> {
        let endpoint_url = endpoint_url(&cfg.base_url)?;
        let http = BasicAuthTransport::new(cfg, build_http_client()?);

        Ok(Self {
            endpoint_url,
            http: Arc::new(http),
        })
    }

    /// Create a client sending through `inner`, with credentials from `cfg`
    /// installed on top of it.
    pub fn with_executor<E>(cfg: &Config, inner: E) -> Result<Self>
    where
        E: RequestExecutor + 'static,
    {
        let endpoint_url = endpoint_url(&cfg.base_url)?;

        Ok(Self {
            endpoint_url,
            http: Arc::new(BasicAuthTransport::new(cfg, inner)),
        })
    }

    /// The resource root, e.g. `https://master/api/v1`.
    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// Return all pods in the default namespace, regardless of status.
    pub async fn list_pods(&self, ctx: &Context) -> Result<Vec<Pod>> {
        let list: PodList = self.get_json(ctx, DEFAULT_PODS).await?;
        tracing::debug!("Decoded {} pods", list.items.len());
        Ok(list.items)
    }

    /// One GET against `endpoint_url + path`, decoded as `T`.
    async fn get_json<T: DeserializeOwned>(&self, ctx: &Context, path: &str) -> Result<T> {
        let get_url = format!("{}{}", self.endpoint_url, path);
        let method = Method::GET;

        let url = Url::parse(&get_url).map_err(|source| Error::BuildRequest {
            method: method.clone(),
            url: get_url.clone(),
            source,
        })?;
        let request = Request::new(method.clone(), url);

        tracing::debug!("{} {}", method, get_url);

        let cancelled = |reason| Error::Cancelled {
            method: method.clone(),
            url: get_url.clone(),
            reason,
        };

        let response = ctx
            .run(self.http.execute(&request))
            .await
            .map_err(cancelled)?
            .map_err(|source| Error::Transport {
                method: method.clone(),
                url: get_url.clone(),
                source,
            })?;

        let status = response.status();
        // `bytes()` consumes the response, so the connection is released on every path.
        let body = ctx
            .run(response.bytes())
            .await
            .map_err(cancelled)?
            .map_err(|source| Error::ReadBody {
                url: get_url.clone(),
                source,
            })?;

        if status != StatusCode::OK {
            let body = String::from_utf8_lossy(&body).into_owned();
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(Error::Status {
                status,
                url: get_url,
                body,
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

impl std::fmt::Debug for KubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeClient")
            .field("endpoint_url", &self.endpoint_url)
            .finish_non_exhaustive()
    }
}

/// Validate `base_url` and compose the resource root from it.
fn endpoint_url(base_url: &str) -> Result<String> {
    let valid = Url::parse(base_url).map_err(|source| Error::InvalidBaseUrl {
        url: base_url.to_string(),
        source,
    })?;

    Ok(format!("{}{}", valid.as_str().trim_end_matches('/'), API_ENDPOINT))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> Config {
        Config {
            base_url: base_url.to_string(),
            username: "admin".to_string(),
            password: "pw".to_string(),
        }
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = KubeClient::new(&config("http://host:1234/")).unwrap();
        assert_eq!(client.endpoint_url(), "http://host:1234/api/v1");
    }

    #[test]
    fn test_endpoint_without_trailing_slash() {
        let client = KubeClient::new(&config("http://host:1234")).unwrap();
        assert_eq!(client.endpoint_url(), "http://host:1234/api/v1");
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let client = KubeClient::new(&config("https://proxy.example.com/k8s/")).unwrap();
        assert_eq!(client.endpoint_url(), "https://proxy.example.com/k8s/api/v1");
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let err = KubeClient::new(&config("http://[::1")).unwrap_err();
        match &err {
            Error::InvalidBaseUrl { url, .. } => assert_eq!(url, "http://[::1"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("failed to parse URL"));
    }

    #[test]
    fn test_relative_base_url_is_rejected() {
        let err = KubeClient::new(&config("/just/a/path")).unwrap_err();
        assert!(matches!(err, Error::InvalidBaseUrl { .. }));
    }

    #[test]
    fn test_client_is_shareable_across_tasks() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<KubeClient>();
    }

    #[test]
    fn test_config_debug_redacts_password() {
        let out = format!("{:?}", config("http://host"));
        assert!(!out.contains("pw\""));
        assert!(out.contains("<redacted>"));
    }
}
