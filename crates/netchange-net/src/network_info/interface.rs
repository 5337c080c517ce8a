//! Network interface enumeration.

use std::collections::{BTreeMap, BTreeSet};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use netchange_core::logging::targets;

/// A network interface on the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterface {
    /// Interface name (e.g., "eth0", "en0", "Wi-Fi").
    pub name: String,
    /// Interface index.
    pub index: u32,
    /// Whether the interface is currently up.
    pub is_up: bool,
    /// Interface type (Ethernet, Loopback, etc.).
    pub interface_type: InterfaceType,
    /// IPv4 addresses assigned to this interface.
    pub ipv4_addresses: Vec<Ipv4Info>,
    /// IPv6 addresses assigned to this interface.
    pub ipv6_addresses: Vec<Ipv6Addr>,
}

/// IPv4 address information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Info {
    /// The IPv4 address.
    pub address: Ipv4Addr,
    /// Network prefix length (CIDR notation).
    pub prefix_len: u8,
}

/// Type of network interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceType {
    /// Physical or bridged interface.
    Ethernet,
    /// Loopback interface (localhost).
    Loopback,
    /// Virtual or tunnel interface.
    Virtual,
}

impl std::fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterfaceType::Ethernet => write!(f, "Ethernet"),
            InterfaceType::Loopback => write!(f, "Loopback"),
            InterfaceType::Virtual => write!(f, "Virtual"),
        }
    }
}

impl NetworkInterface {
    /// Get all network interfaces on the system, up or down.
    pub fn list() -> Vec<NetworkInterface> {
        netdev::get_interfaces()
            .into_iter()
            .map(|iface| {
                let ipv4_addresses = iface
                    .ipv4
                    .iter()
                    .map(|net| Ipv4Info {
                        address: net.addr(),
                        prefix_len: net.prefix_len(),
                    })
                    .collect();

                let ipv6_addresses = iface.ipv6.iter().map(|net| net.addr()).collect();

                // netdev doesn't reliably distinguish WiFi from Ethernet
                let interface_type = if iface.is_loopback() {
                    InterfaceType::Loopback
                } else if iface.is_tun() {
                    InterfaceType::Virtual
                } else {
                    InterfaceType::Ethernet
                };

                NetworkInterface {
                    name: iface.name.clone(),
                    index: iface.index,
                    is_up: iface.is_up(),
                    interface_type,
                    ipv4_addresses,
                    ipv6_addresses,
                }
            })
            .collect()
    }

    /// Get all IP addresses (both v4 and v6) for this interface.
    pub fn all_addresses(&self) -> Vec<IpAddr> {
        let mut addrs: Vec<IpAddr> = self
            .ipv4_addresses
            .iter()
            .map(|info| IpAddr::V4(info.address))
            .collect();
        addrs.extend(self.ipv6_addresses.iter().copied().map(IpAddr::V6));
        addrs
    }

    /// Check if this interface has any IP addresses assigned.
    pub fn has_addresses(&self) -> bool {
        !self.ipv4_addresses.is_empty() || !self.ipv6_addresses.is_empty()
    }

    /// Check if this is the loopback interface.
    pub fn is_loopback(&self) -> bool {
        self.interface_type == InterfaceType::Loopback
    }
}

/// Names of the interfaces that are currently up, sorted and deduplicated.
///
/// An empty list is a valid answer: nothing is up.
pub fn active_interfaces() -> Vec<String> {
    let names = active_names(&NetworkInterface::list());
    tracing::trace!(target: targets::INTERFACES, ?names, "enumerated active interfaces");
    names
}

/// IPv4 addresses of each interface that is currently up, keyed by name.
///
/// Interfaces without an IPv4 address map to an empty list.
pub fn active_interface_addresses() -> BTreeMap<String, Vec<Ipv4Addr>> {
    active_ipv4_map(&NetworkInterface::list())
}

fn active_names(interfaces: &[NetworkInterface]) -> Vec<String> {
    interfaces
        .iter()
        .filter(|iface| iface.is_up)
        .map(|iface| iface.name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn active_ipv4_map(interfaces: &[NetworkInterface]) -> BTreeMap<String, Vec<Ipv4Addr>> {
    let mut map: BTreeMap<String, Vec<Ipv4Addr>> = BTreeMap::new();
    for iface in interfaces.iter().filter(|iface| iface.is_up) {
        let entry = map.entry(iface.name.clone()).or_default();
        entry.extend(iface.ipv4_addresses.iter().map(|info| info.address));
    }
    for addresses in map.values_mut() {
        addresses.sort_unstable();
        addresses.dedup();
    }
    map
}
