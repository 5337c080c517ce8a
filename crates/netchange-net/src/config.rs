//! Monitor configuration.
//!
//! ```ignore
//! use netchange_net::MonitorConfig;
//!
//! let config = MonitorConfig::from_toml_str(r#"
//! interval_secs = 5
//! track_interface_addresses = true
//! "#)?;
//! assert_eq!(config.interval().as_secs(), 5);
//! ```

use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default polling interval in seconds.
pub const DEFAULT_INTERVAL_SECS: u64 = 2;

/// Default timeout for each external SSID utility, in milliseconds.
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 2_000;

/// Default target the outbound-address probe "connects" a UDP socket to.
pub const DEFAULT_PROBE_ADDRESS: SocketAddr =
    SocketAddr::new(std::net::IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 80);

/// Configuration for a [`NetworkChangeDetector`](crate::NetworkChangeDetector).
///
/// Every field has a default, so a TOML document only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    /// Seconds between ticks when started with [`start`](crate::NetworkChangeDetector::start).
    pub interval_secs: u64,
    /// Upper bound on each external SSID utility invocation, in milliseconds.
    pub command_timeout_ms: u64,
    /// Address the outbound-address probe connects its UDP socket to.
    /// No packets are sent.
    pub probe_address: SocketAddr,
    /// Also track the IPv4 addresses of each active interface as a change
    /// dimension.
    pub track_interface_addresses: bool,
    /// Run the next tick immediately when the OS reports an interface change,
    /// instead of waiting for the interval to elapse.
    pub wake_on_os_events: bool,
    /// Name of the background monitor thread.
    pub thread_name: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            probe_address: DEFAULT_PROBE_ADDRESS,
            track_interface_addresses: false,
            wake_on_os_events: false,
            thread_name: "netchange-monitor".to_string(),
        }
    }
}

impl MonitorConfig {
    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Check the invariants deserialization cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.command_timeout_ms == 0 {
            return Err(ConfigError::ZeroCommandTimeout);
        }
        Ok(())
    }

    /// The polling interval.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// The per-command timeout for SSID utilities.
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}
