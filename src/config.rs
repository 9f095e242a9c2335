// Proxy configuration: TOML file with per-field defaults, credentials overridable from the environment

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

pub const API_KEY_ENV: &str = "AMADEUS_API_KEY";
pub const API_SECRET_ENV: &str = "AMADEUS_API_SECRET";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub upstream: ClientConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Upstream travel API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub api_secret: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://test.api.amadeus.com".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            api_secret: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

// Where the loaded settings came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    File,
    Defaults,
}

impl ProxyConfig {
    // Missing file falls back to defaults; a file that exists but does not parse is an error
    // Runs before tracing is installed, so the caller logs the source
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<(Self, ConfigSource)> {
        let path = path.as_ref();
        let (mut config, source) = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            (toml::from_str::<ProxyConfig>(&content)?, ConfigSource::File)
        } else {
            (ProxyConfig::default(), ConfigSource::Defaults)
        };

        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok((config, source))
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.upstream.api_key = key;
        }
        if let Some(secret) = lookup(API_SECRET_ENV).filter(|v| !v.is_empty()) {
            self.upstream.api_secret = secret;
        }
    }
}

impl ServerConfig {
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    // Joins the base URL and an absolute API path without doubling slashes
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.base_url.trim().is_empty() {
            return Err(ClientError::ConfigError("base_url is empty".to_string()));
        }
        if self.api_key.trim().is_empty() {
            return Err(ClientError::ConfigError(format!(
                "api_key is empty (set it in the config file or {})",
                API_KEY_ENV
            )));
        }
        if self.api_secret.trim().is_empty() {
            return Err(ClientError::ConfigError(format!(
                "api_secret is empty (set it in the config file or {})",
                API_SECRET_ENV
            )));
        }
        if self.timeout_ms == 0 {
            return Err(ClientError::ConfigError(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
