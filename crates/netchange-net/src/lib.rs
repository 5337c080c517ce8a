//! Network change detection.
//!
//! This crate watches the host's network state and tells the application
//! when it changes, so services that bind to the network (mDNS responders,
//! discovery beacons, socket listeners) can restart themselves.
//!
//! Three facts are sampled on a fixed interval:
//!
//! - **Outbound IP**: the local address the OS selects for outbound traffic
//! - **Active interfaces**: the names of all interfaces that are up
//! - **Wi-Fi SSID**: the associated wireless network, via platform tools
//!
//! Any difference from the previous sample is logged field by field and the
//! change callback is invoked once.
//!
//! # Example
//!
//! ```ignore
//! use netchange_net::NetworkChangeDetector;
//! use std::time::Duration;
//!
//! let detector = NetworkChangeDetector::new(|| {
//!     println!("network changed");
//! });
//!
//! detector.start_monitoring(Duration::from_secs(2))?;
//! // ... run the application ...
//! detector.stop_monitoring()?;
//! ```
//!
//! # Configuration
//!
//! ```ignore
//! use netchange_net::{MonitorConfig, NetworkChangeDetector};
//!
//! let config = MonitorConfig::load("netchange.toml")?;
//! let detector = NetworkChangeDetector::with_config(config, restart_discovery);
//! detector.start()?;
//! ```
//!
//! # Logging
//!
//! All output goes through `tracing`. Change lines are emitted at `info`
//! level on the `netchange::monitor` target with a `[CHANGE]` prefix;
//! resolver failures are logged at `debug`. Install any subscriber to see
//! them.

pub mod config;
pub mod error;
pub mod network_info;

pub use config::MonitorConfig;
pub use error::{ConfigError, MonitorError, ResolverError, Result};
pub use network_info::{
    NetworkChangeDetector, NetworkChangeDetectorBuilder, NetworkProbe, NetworkSnapshot,
    SnapshotChange, SnapshotComparator, StartOutcome, StopOutcome, SystemProbe,
};
