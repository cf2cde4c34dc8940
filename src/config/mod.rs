//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables
//! - CLI arguments (applied last by the binary)

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GrowcubeError, Result};
use crate::transport::DEFAULT_PORT;

/// Environment variable for the device address
pub const ENV_HOST: &str = "GROWCUBE_HOST";

/// Environment variable for the device port
pub const ENV_PORT: &str = "GROWCUBE_PORT";

/// Environment variable for the session timeout in seconds
pub const ENV_TIMEOUT: &str = "GROWCUBE_TIMEOUT";

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Device connection settings
    #[serde(default)]
    pub device: DeviceConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| GrowcubeError::Config(format!("Failed to read config file: {e}")))?;

        Ok(toml::from_str(&content)?)
    }

    /// Default config file location (`<config_dir>/growcube/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("growcube").join("config.toml"))
    }

    /// Load from `path` if given, otherwise from the default location if it
    /// exists, otherwise defaults. Environment variables are applied on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => {
                    tracing::debug!("Loading config from {}", path.display());
                    Self::from_file(path)?
                },
                None => Self::default(),
            },
        };

        config.with_env(|key| std::env::var(key).ok())
    }

    /// Override fields from environment-style lookups.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.device.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.device.port = port
                .parse()
                .map_err(|_| GrowcubeError::Config(format!("{ENV_PORT} is not a port: {port}")))?;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT) {
            self.device.timeout_secs = timeout.parse().map_err(|_| {
                GrowcubeError::Config(format!("{ENV_TIMEOUT} is not a number: {timeout}"))
            })?;
        }
        Ok(self)
    }
}

/// Device connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Device address (IP or hostname)
    pub host: String,

    /// Device TCP port
    pub port: u16,

    /// Overall session budget in seconds
    pub timeout_secs: u64,

    /// Upper bound for opening the connection, in seconds
    pub connect_timeout_secs: u64,

    /// Stop after the handshake without requesting readings
    pub connect_only: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            timeout_secs: 15, // device typically reports within 10s
            connect_timeout_secs: 5,
            connect_only: false,
        }
    }
}

impl DeviceConfig {
    /// Config for `host` with defaults for everything else.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Set the session timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Only check connectivity.
    pub fn connect_only(mut self, connect_only: bool) -> Self {
        self.connect_only = connect_only;
        self
    }

    /// Session budget.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Get the full device address
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Reject configurations a session cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(GrowcubeError::Config("device host is not set".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(GrowcubeError::Config("timeout must be positive".to_string()));
        }
        Ok(())
    }
}
