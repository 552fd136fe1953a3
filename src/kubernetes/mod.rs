//! Kubernetes API interaction module
//!
//! A small client for the Kubernetes v1 REST API authenticated with HTTP
//! Basic credentials.
//!
//! # Module Structure
//!
//! - [`api`] - JSON resource types (`Pod`, `PodList`)
//! - [`auth`] - Basic Authorization executor decorator
//! - [`client`] - Main client: endpoint composition and typed operations
//! - [`context`] - Cancellation and deadlines for a single call
//! - [`error`] - Error taxonomy
//! - [`http`] - The request executor seam and HTTP helpers
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use gke_pods::kubernetes::{Config, Context, KubeClient};
//!
//! async fn example() -> gke_pods::kubernetes::Result<()> {
//!     let client = KubeClient::new(&Config {
//!         base_url: "https://35.1.2.3".to_string(),
//!         username: "admin".to_string(),
//!         password: "secret".to_string(),
//!     })?;
//!     let ctx = Context::with_timeout(Duration::from_secs(10));
//!     for pod in client.list_pods(&ctx).await? {
//!         println!("{}", pod.name());
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod context;
pub mod error;
pub mod http;

pub use api::{Pod, PodList};
pub use auth::BasicAuthTransport;
pub use client::{Config, KubeClient};
pub use context::Context;
pub use error::{CancelReason, Error, Result, TransportError};
pub use http::RequestExecutor;
