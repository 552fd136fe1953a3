//! Configuration Management
//!
//! Handles persistent settings for the gke-pods CLI and resolves them into a
//! [`kubernetes::Config`](crate::kubernetes::Config).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::kubernetes;

pub const ENV_BASE_URL: &str = "KUBE_BASE_URL";
pub const ENV_USERNAME: &str = "KUBE_USERNAME";
pub const ENV_PASSWORD: &str = "KUBE_PASSWORD";

/// User settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    /// Cluster master URL
    #[serde(default)]
    pub base_url: Option<String>,
    /// Basic auth user
    #[serde(default)]
    pub username: Option<String>,
    /// Basic auth password; read if present, never written by `save`
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

/// Values given on the command line. They win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Settings {
    /// Directory holding the settings file and the log file
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gke-pods"))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load settings from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable settings file {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Resolve the client config from the process environment
    pub fn resolve(&self, overrides: &Overrides) -> Result<kubernetes::Config> {
        self.resolve_with(overrides, |key| std::env::var(key).ok())
    }

    /// Resolve the client config (CLI > environment > settings file)
    pub fn resolve_with<F>(&self, overrides: &Overrides, env: F) -> Result<kubernetes::Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |cli: &Option<String>, key: &str, stored: &Option<String>| {
            cli.clone()
                .or_else(|| env(key).filter(|v| !v.is_empty()))
                .or_else(|| stored.clone())
        };

        let base_url = pick(&overrides.base_url, ENV_BASE_URL, &self.base_url).with_context(|| {
            format!("No cluster URL configured. Set {ENV_BASE_URL} or use --base-url")
        })?;

        Ok(kubernetes::Config {
            base_url,
            username: pick(&overrides.username, ENV_USERNAME, &self.username).unwrap_or_default(),
            password: pick(&overrides.password, ENV_PASSWORD, &self.password).unwrap_or_default(),
        })
    }

    /// Remember the base URL and username used for a successful call
    pub fn remember(&mut self, cfg: &kubernetes::Config) -> Result<()> {
        self.base_url = Some(cfg.base_url.clone());
        self.username = Some(cfg.username.clone());
        self.save()
    }
}
