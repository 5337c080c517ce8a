//! Error types for the network change detector.

use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// A resolver could not determine a value this time.
///
/// These never escape a resolver's public entry point: the address, interface
/// and SSID resolvers log them and report "unknown" instead.
#[derive(Error, Debug)]
pub enum ResolverError {
    /// The external utility is not installed or not on `PATH`.
    #[error("`{program}` not found")]
    CommandNotFound {
        /// Program that was invoked.
        program: String,
    },

    /// The external utility exited unsuccessfully.
    #[error("`{program}` exited with {status}")]
    CommandFailed {
        /// Program that was invoked.
        program: String,
        /// Its exit status.
        status: ExitStatus,
    },

    /// The external utility did not finish in time and was killed.
    #[error("`{program}` did not finish within {timeout:?}")]
    Timeout {
        /// Program that was invoked.
        program: String,
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The OS bound the probe socket to an unspecified address (no route).
    #[error("no outbound route: socket bound to {0}")]
    UnspecifiedAddress(IpAddr),

    /// I/O error while talking to the OS.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by the lifecycle controller.
///
/// Starting an already running detector or stopping a stopped one is not an
/// error; see [`StartOutcome`](crate::StartOutcome) and
/// [`StopOutcome`](crate::StopOutcome).
#[derive(Error, Debug)]
pub enum MonitorError {
    /// The polling interval must be greater than zero.
    #[error("monitoring interval must be greater than zero")]
    InvalidInterval,

    /// The background thread could not be spawned.
    #[error("failed to spawn monitor thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// start/stop was called from inside the change callback.
    #[error("start/stop cannot be called from the monitor thread")]
    CalledFromMonitorThread,
}

/// Errors raised while loading a [`MonitorConfig`](crate::MonitorConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// `interval_secs` was zero.
    #[error("interval_secs must be greater than zero")]
    ZeroInterval,

    /// `command_timeout_ms` was zero.
    #[error("command_timeout_ms must be greater than zero")]
    ZeroCommandTimeout,
}

/// A specialized Result type for monitor operations.
pub type Result<T> = std::result::Result<T, MonitorError>;
