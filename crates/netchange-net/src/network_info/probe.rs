//! Taking snapshots of the host's network state.

use std::fmt;

use super::address::AddressResolver;
use super::interface::{active_interface_addresses, active_interfaces};
use super::snapshot::NetworkSnapshot;
use super::ssid::SsidResolver;
use crate::config::MonitorConfig;

/// Source of [`NetworkSnapshot`]s for the monitor loop.
///
/// Implementations must not fail: anything they cannot determine is reported
/// as unknown (`None` or empty). Closures returning a snapshot implement this
/// trait, which is convenient for tests.
pub trait NetworkProbe: Send + Sync + 'static {
    /// Observe the current network state.
    fn snapshot(&self) -> NetworkSnapshot;
}

impl<F> NetworkProbe for F
where
    F: Fn() -> NetworkSnapshot + Send + Sync + 'static,
{
    fn snapshot(&self) -> NetworkSnapshot {
        self()
    }
}

/// Probe backed by the operating system.
///
/// Runs the address, interface and SSID resolvers one after another on the
/// calling thread.
pub struct SystemProbe {
    address: AddressResolver,
    ssid: SsidResolver,
    track_addresses: bool,
}

impl SystemProbe {
    /// A probe with the default probe target and the platform SSID chain.
    pub fn new() -> Self {
        Self::from_config(&MonitorConfig::default())
    }

    /// A probe configured from `config`.
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            address: AddressResolver::new(config.probe_address),
            ssid: SsidResolver::platform_default(config.command_timeout()),
            track_addresses: config.track_interface_addresses,
        }
    }

    /// Replace the SSID strategy chain.
    pub fn with_ssid_resolver(mut self, ssid: SsidResolver) -> Self {
        self.ssid = ssid;
        self
    }

    /// Replace the outbound-address resolver.
    pub fn with_address_resolver(mut self, address: AddressResolver) -> Self {
        self.address = address;
        self
    }

    /// Enable or disable per-interface address tracking.
    pub fn track_addresses(mut self, enabled: bool) -> Self {
        self.track_addresses = enabled;
        self
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SystemProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemProbe")
            .field("address", &self.address)
            .field("ssid", &self.ssid)
            .field("track_addresses", &self.track_addresses)
            .finish()
    }
}

impl NetworkProbe for SystemProbe {
    fn snapshot(&self) -> NetworkSnapshot {
        let snapshot = NetworkSnapshot::new(
            self.address.current_ip(),
            active_interfaces(),
            self.ssid.current_ssid(),
        );

        if self.track_addresses {
            snapshot.with_addresses(active_interface_addresses())
        } else {
            snapshot
        }
    }
}
