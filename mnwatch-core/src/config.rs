//! Configuration loading
//!
//! Settings live in a TOML file (default `~/.config/mnwatch/config.toml`)
//! with one table per concern:
//!
//! ```toml
//! inventory_path = "~/fleet/inventory.ini"
//!
//! [ssh]
//! username = "ubuntu"
//! private_key_path = "~/.ssh/fleet"
//!
//! [poll]
//! poll_interval_ms = 4000
//! concurrency = 10
//!
//! [http]
//! listen = "0.0.0.0:3001"
//! ```
//!
//! Every field has a default. Command-line flags and environment variables
//! are applied on top through [`ConfigOverrides`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::monitoring::PollSettings;

/// Marker every supported private key file contains
const PRIVATE_KEY_MARKER: &str = "PRIVATE KEY";

/// SSH connection settings (`[ssh]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshSettings {
    /// Remote user (default: `ubuntu`)
    #[serde(default = "default_username")]
    pub username: String,
    /// Remote port (default: 22)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Private key used for every node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_path: Option<PathBuf>,
}

fn default_username() -> String {
    "ubuntu".to_string()
}

const fn default_port() -> u16 {
    22
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            username: default_username(),
            port: default_port(),
            private_key_path: None,
        }
    }
}

/// HTTP surface and live-stream settings (`[http]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Listen address (default: `0.0.0.0:3001`)
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Live-stream subscriber ceiling (default: 100)
    #[serde(default = "default_max_subscribers")]
    pub max_subscribers: usize,
    /// Keepalive interval for live streams in seconds (default: 30)
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,
    /// Frames buffered per subscriber before it is dropped (default: 64)
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,
}

fn default_listen() -> String {
    "0.0.0.0:3001".to_string()
}

const fn default_max_subscribers() -> usize {
    100
}

const fn default_keepalive_secs() -> u64 {
    30
}

const fn default_subscriber_buffer() -> usize {
    64
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_subscribers: default_max_subscribers(),
            keepalive_secs: default_keepalive_secs(),
            subscriber_buffer: default_subscriber_buffer(),
        }
    }
}

impl HttpSettings {
    /// Keepalive interval, at least one second
    #[must_use]
    pub fn keepalive(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs.max(1))
    }

    /// Replaces the port of the listen address, keeping its host part
    pub fn set_listen_port(&mut self, port: u16) {
        let host = self
            .listen
            .rsplit_once(':')
            .map_or(self.listen.as_str(), |(host, _)| host);
        self.listen = format!("{host}:{port}");
    }
}

/// Complete monitor configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Ansible-style inventory listing the fleet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_path: Option<PathBuf>,
    /// SSH settings
    #[serde(default)]
    pub ssh: SshSettings,
    /// Scheduler and timeout settings
    #[serde(default)]
    pub poll: PollSettings,
    /// HTTP settings
    #[serde(default)]
    pub http: HttpSettings,
}

/// Values from the command line or environment that win over the file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// `INVENTORY_PATH`
    pub inventory_path: Option<PathBuf>,
    /// `SSH_KEY_PATH`
    pub private_key_path: Option<PathBuf>,
    /// `SSH_USER`
    pub username: Option<String>,
    /// `SSH_PORT`
    pub ssh_port: Option<u16>,
    /// `POLL_INTERVAL_MS`
    pub poll_interval_ms: Option<u64>,
    /// `POLL_CONCURRENCY`
    pub concurrency: Option<usize>,
    /// `PORT`, the HTTP listen port
    pub listen_port: Option<u16>,
}

/// Validated SSH identity shared by every poll.
///
/// The key file is read once during [`MonitorConfig::validate`]; afterwards
/// only its path is handed to the `ssh` client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshCredentials {
    /// Remote user
    pub username: String,
    /// Remote port
    pub port: u16,
    /// Checked private key path
    pub key_path: PathBuf,
}

impl MonitorConfig {
    /// Default config file location (`<config dir>/mnwatch/config.toml`)
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mnwatch").join("config.toml"))
    }

    /// Loads the configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used if present, otherwise built-in defaults. `~` in paths is expanded.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => path,
                None => {
                    tracing::debug!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Read {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Parses configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML or wrong value types.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let mut config: Self =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.expand_paths();
        Ok(config)
    }

    /// Applies command-line and environment values
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(path) = &overrides.inventory_path {
            self.inventory_path = Some(path.clone());
        }
        if let Some(path) = &overrides.private_key_path {
            self.ssh.private_key_path = Some(path.clone());
        }
        if let Some(user) = &overrides.username {
            self.ssh.username.clone_from(user);
        }
        if let Some(port) = overrides.ssh_port {
            self.ssh.port = port;
        }
        if let Some(ms) = overrides.poll_interval_ms {
            self.poll.poll_interval_ms = ms;
        }
        if let Some(n) = overrides.concurrency {
            self.poll.concurrency = n;
        }
        if let Some(port) = overrides.listen_port {
            self.http.set_listen_port(port);
        }
        self.expand_paths();
    }

    /// Returns the inventory path
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when no inventory is configured.
    pub fn inventory_path(&self) -> ConfigResult<&Path> {
        self.inventory_path.as_deref().ok_or_else(|| {
            ConfigError::Invalid("inventory_path is not set (use --inventory or INVENTORY_PATH)".into())
        })
    }

    /// Checks values and loads the SSH identity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for zero concurrency, zero poll
    /// interval or a missing key path, and [`ConfigError::PrivateKey`] when
    /// the key file is unreadable or does not look like a private key.
    pub fn validate(&self) -> ConfigResult<SshCredentials> {
        if self.poll.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".into()));
        }
        if self.poll.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be positive".into()));
        }
        if self.ssh.username.trim().is_empty() {
            return Err(ConfigError::Invalid("ssh username is empty".into()));
        }

        let key_path = self.ssh.private_key_path.clone().ok_or_else(|| {
            ConfigError::Invalid("private_key_path is not set (use --key or SSH_KEY_PATH)".into())
        })?;
        let key = std::fs::read_to_string(&key_path).map_err(|e| ConfigError::PrivateKey {
            path: key_path.clone(),
            reason: e.to_string(),
        })?;
        if !key.contains(PRIVATE_KEY_MARKER) {
            return Err(ConfigError::PrivateKey {
                path: key_path,
                reason: "file does not contain a private key".into(),
            });
        }

        Ok(SshCredentials {
            username: self.ssh.username.clone(),
            port: self.ssh.port,
            key_path,
        })
    }

    fn expand_paths(&mut self) {
        let expand = |p: &Path| PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).into_owned());
        self.inventory_path = self.inventory_path.as_deref().map(expand);
        self.ssh.private_key_path = self.ssh.private_key_path.as_deref().map(expand);
    }
}
