use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::fsio;

pub const DEFAULT_MAX_CONNECTED_HOSTS: u32 = 64;
pub const DEFAULT_TIMEOUT_IN_SECS: u32 = 30;

const SECTION: &str = "server";

/// Validated server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    ip: IpAddr,
    port: u16,
    max_connected_hosts: u32,
    timeout_in_secs: u32,
}

/// Keys as they appear in the TOML document, before validation.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawServer {
    ip: String,
    port: u16,
    #[serde(default = "default_max_connected_hosts")]
    max_connected_hosts: u32,
    #[serde(default = "default_timeout_in_secs")]
    timeout_in_secs: u32,
}

const fn default_max_connected_hosts() -> u32 {
    DEFAULT_MAX_CONNECTED_HOSTS
}

const fn default_timeout_in_secs() -> u32 {
    DEFAULT_TIMEOUT_IN_SECS
}

impl ServerConfig {
    /// Build a config directly, applying the same validation as the TOML path.
    ///
    /// # Errors
    /// Returns `ConfigError::ZeroLimit` when a limit is zero.
    pub fn new(
        ip: IpAddr,
        port: u16,
        max_connected_hosts: u32,
        timeout_in_secs: u32,
    ) -> Result<Self, ConfigError> {
        if max_connected_hosts == 0 {
            return Err(ConfigError::ZeroLimit("max_connected_hosts"));
        }
        if timeout_in_secs == 0 {
            return Err(ConfigError::ZeroLimit("timeout_in_secs"));
        }
        Ok(Self {
            ip,
            port,
            max_connected_hosts,
            timeout_in_secs,
        })
    }

    /// Parse configuration text. Keys may sit at the top level or under `[server]`.
    ///
    /// # Errors
    /// Returns an error when the text is not valid TOML, has unknown or missing keys,
    /// or fails validation.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(text)?;
        Self::from_table(table)
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or its contents are invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let table: toml::Table = fsio::read_toml(path)?;
        Self::from_table(table)
    }

    fn from_table(mut table: toml::Table) -> Result<Self, ConfigError> {
        let section = match table.remove(SECTION) {
            Some(inner @ toml::Value::Table(_)) if table.is_empty() => inner,
            Some(other) => {
                table.insert(SECTION.to_string(), other);
                toml::Value::Table(table)
            }
            None => toml::Value::Table(table),
        };
        let raw: RawServer = section.try_into()?;
        let ip = raw
            .ip
            .trim()
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::InvalidIp(raw.ip.clone()))?;
        Self::new(ip, raw.port, raw.max_connected_hosts, raw.timeout_in_secs)
    }

    #[must_use]
    pub const fn ip(&self) -> IpAddr {
        self.ip
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub const fn max_connected_hosts(&self) -> u32 {
        self.max_connected_hosts
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_in_secs as u64)
    }

    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    /// `ip:port`, with IPv6 addresses bracketed.
    #[must_use]
    pub fn full_addr(&self) -> String {
        self.addr().to_string()
    }
}

/// Accept a command-line argument naming the server config.
///
/// # Errors
/// Returns `ConfigError::Missing` when the argument does not name a regular file.
pub fn config_toml(arg: impl Into<PathBuf>) -> Result<PathBuf, ConfigError> {
    let path = arg.into();
    if fsio::is_regular_file(&path) {
        Ok(path)
    } else {
        Err(ConfigError::Missing(path))
    }
}
