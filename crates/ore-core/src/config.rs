//! Client configuration management.
//!
//! This module handles loading and saving the client configuration: which
//! Ore instance to talk to, how to present session tokens, and where to
//! cache them.
//!
//! Configuration is stored at `~/.config/ore-client/config.json`.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, AuthScheme, ClientOptions, ReqwestTransport};
use crate::auth::{FileStore, KeyringStore, MemoryStore, SessionStore};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "ore-client";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_BASE_URL: &str = "https://ore.spongepowered.org";

/// Where sessions are cached between runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Memory,
    #[default]
    File,
    Keyring,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(StoreKind::Memory),
            "file" => Ok(StoreKind::File),
            "keyring" => Ok(StoreKind::Keyring),
            other => Err(format!("unknown session store: {} (expected memory, file or keyring)", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub auth_scheme: AuthScheme,
    pub csrf_token: Option<String>,
    /// Cookie header of a logged-in browser session, for user sessions
    pub session_cookie: Option<String>,
    /// Request user sessions even when not told a user is logged in
    pub always_try_login: bool,
    pub store: StoreKind,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_scheme: AuthScheme::default(),
            csrf_token: None,
            session_cookie: None,
            always_try_login: false,
            store: StoreKind::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Load from an explicit path, falling back to defaults when absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Session cache directory, one per Ore host
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME).join(self.host_dir()?))
    }

    fn host_dir(&self) -> Result<String> {
        let url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base URL: {}", self.base_url))?;
        let host = url
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("Base URL has no host: {}", self.base_url))?;
        Ok(match url.port() {
            Some(port) => format!("{}_{}", host, port),
            None => host.to_string(),
        })
    }

    /// Open the configured session store
    pub fn open_store(&self) -> Result<Arc<dyn SessionStore>> {
        Ok(match self.store {
            StoreKind::Memory => Arc::new(MemoryStore::new()),
            StoreKind::File => Arc::new(FileStore::new(self.cache_dir()?)),
            StoreKind::Keyring => Arc::new(KeyringStore::with_service(format!(
                "{}:{}",
                APP_NAME,
                self.host_dir()?
            ))),
        })
    }

    /// Client options for this configuration; `logged_in` is the caller's user signal
    pub fn client_options(&self, logged_in: bool) -> ClientOptions {
        ClientOptions::new(self.base_url.clone())
            .has_user(logged_in || self.always_try_login)
            .auth_scheme(self.auth_scheme)
            .csrf_token(self.csrf_token.clone())
    }

    /// Build a ready-to-use client with the configured store and transport
    pub fn build_client(&self, logged_in: bool) -> Result<ApiClient> {
        let transport = match self.session_cookie {
            Some(ref cookie) => ReqwestTransport::with_cookie(cookie),
            None => ReqwestTransport::new(),
        }
        .context("Failed to create HTTP transport")?;

        Ok(ApiClient::with_transport(
            self.client_options(logged_in),
            self.open_store()?,
            Arc::new(transport),
        ))
    }
}
