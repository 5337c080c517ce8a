//! Network state observation and change monitoring.
//!
//! This module gathers the three facts the detector compares between ticks
//! and the monitor that drives the comparison:
//!
//! - **Outbound address**: the local IP the OS picks for outbound traffic
//! - **Active interfaces**: names of the interfaces that are up
//! - **Wi-Fi network**: the SSID reported by the platform's wireless tools
//! - **Change monitoring**: a background loop that compares snapshots and
//!   calls back on change
//!
//! # Example
//!
//! ```ignore
//! use netchange_net::network_info::{NetworkInterface, NetworkProbe, SystemProbe};
//!
//! // List all network interfaces
//! for iface in NetworkInterface::list() {
//!     println!("Interface: {} ({}, up: {})", iface.name, iface.interface_type, iface.is_up);
//!     for addr in &iface.ipv4_addresses {
//!         println!("  IPv4: {}/{}", addr.address, addr.prefix_len);
//!     }
//! }
//!
//! // Take one snapshot of the current state
//! let snapshot = SystemProbe::new().snapshot();
//! println!("ip: {:?}, interfaces: {:?}, ssid: {:?}",
//!     snapshot.ip, snapshot.interfaces, snapshot.ssid);
//! ```

mod address;
mod interface;
mod monitor;
mod probe;
mod snapshot;
pub mod ssid;

pub use address::AddressResolver;
pub use interface::{
    InterfaceType, Ipv4Info, NetworkInterface, active_interface_addresses, active_interfaces,
};
pub use monitor::{
    NetworkChangeDetector, NetworkChangeDetectorBuilder, StartOutcome, StopOutcome,
};
pub use probe::{NetworkProbe, SystemProbe};
pub use snapshot::{NetworkSnapshot, SnapshotChange, SnapshotComparator};
pub use ssid::{CommandStrategy, SsidResolver, SsidStrategy};
