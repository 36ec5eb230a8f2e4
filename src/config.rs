use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub fnos: FnosConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
    #[serde(default)]
    pub entities: EntityFilter,
}

/// Connection settings for one fnOS device (the "config entry").
#[derive(Debug, Deserialize, Clone)]
pub struct FnosConfig {
    pub host: String,
    pub username: String,
    pub password: SecretString,
    /// Friendly name used as the entry title; defaults to the host.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
}

impl FnosConfig {
    pub fn title(&self) -> String {
        entry_title(self.name.as_deref(), &self.host)
    }
}

/// Entry title: the friendly name, or the host when no name is given.
pub fn entry_title(name: Option<&str>, host: &str) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => host.trim().to_string(),
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CoordinatorConfig {
    #[serde(default = "default_update_interval")]
    pub update_interval_seconds: u64,
    /// Upper bound for one refresh cycle. Unset means no limit.
    #[serde(default)]
    pub refresh_timeout_seconds: Option<u64>,
}

impl CoordinatorConfig {
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_seconds.max(1))
    }

    pub fn refresh_timeout(&self) -> Option<Duration> {
        self.refresh_timeout_seconds.map(Duration::from_secs)
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            update_interval_seconds: default_update_interval(),
            refresh_timeout_seconds: None,
        }
    }
}

/// Optional per-category selection of child targets, by name.
///
/// `None` selects everything present in the first snapshot.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct EntityFilter {
    #[serde(default)]
    pub volumes: Option<Vec<String>>,
    #[serde(default)]
    pub disks: Option<Vec<String>>,
    #[serde(default)]
    pub network_ifs: Option<Vec<String>>,
}

fn default_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9110
}

fn default_use_tls() -> bool {
    false
}

fn default_verify_ssl() -> bool {
    true
}

fn default_update_interval() -> u64 {
    30
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("FNOS_MONITOR").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
