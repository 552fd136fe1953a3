//! gke-pods
//!
//! A minimal Kubernetes v1 API client authenticated with HTTP Basic
//! credentials, and a tiny HTTP service that timestamps messages.

pub mod config;
pub mod kubernetes;
pub mod msgsrv;

/// Version injected at compile time via GKE_PODS_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("GKE_PODS_VERSION") {
    Some(v) => v,
    None => "dev",
};
