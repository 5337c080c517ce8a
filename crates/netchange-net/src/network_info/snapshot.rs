//! Point-in-time network state and change detection.

use std::collections::BTreeMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

/// The network facts observed at one point in time.
///
/// Snapshots are plain values: a new one is taken on every tick and compared
/// against the previous one by structural equality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkSnapshot {
    /// Local address selected for outbound traffic, if any.
    pub ip: Option<IpAddr>,
    /// Names of the interfaces that are up, sorted and unique.
    pub interfaces: Vec<String>,
    /// Name of the associated Wi-Fi network, if any.
    pub ssid: Option<String>,
    /// IPv4 addresses per active interface. Empty unless address tracking is
    /// enabled.
    pub addresses: BTreeMap<String, Vec<Ipv4Addr>>,
}

impl NetworkSnapshot {
    /// Create a snapshot, normalizing `interfaces` to sorted unique names.
    pub fn new(
        ip: Option<IpAddr>,
        interfaces: impl IntoIterator<Item = impl Into<String>>,
        ssid: Option<String>,
    ) -> Self {
        let mut interfaces: Vec<String> = interfaces.into_iter().map(Into::into).collect();
        interfaces.sort_unstable();
        interfaces.dedup();
        Self {
            ip,
            interfaces,
            ssid,
            addresses: BTreeMap::new(),
        }
    }

    /// Attach per-interface IPv4 addresses.
    pub fn with_addresses(mut self, addresses: BTreeMap<String, Vec<Ipv4Addr>>) -> Self {
        self.addresses = addresses;
        self
    }

    /// The fields that differ from `previous`, in a fixed order:
    /// ip, interfaces, ssid, addresses.
    pub fn changes_from(&self, previous: &NetworkSnapshot) -> Vec<SnapshotChange> {
        let mut changes = Vec::new();

        if self.ip != previous.ip {
            changes.push(SnapshotChange::Ip {
                old: previous.ip,
                new: self.ip,
            });
        }
        if self.interfaces != previous.interfaces {
            changes.push(SnapshotChange::Interfaces {
                old: previous.interfaces.clone(),
                new: self.interfaces.clone(),
            });
        }
        if self.ssid != previous.ssid {
            changes.push(SnapshotChange::Ssid {
                old: previous.ssid.clone(),
                new: self.ssid.clone(),
            });
        }
        if self.addresses != previous.addresses {
            changes.push(SnapshotChange::Addresses {
                old: previous.addresses.clone(),
                new: self.addresses.clone(),
            });
        }

        changes
    }
}

/// One field that differs between two snapshots.
///
/// Displays as `field: old -> new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotChange {
    /// The outbound address changed.
    Ip {
        /// Previous value.
        old: Option<IpAddr>,
        /// Current value.
        new: Option<IpAddr>,
    },
    /// The set of active interfaces changed.
    Interfaces {
        /// Previous value.
        old: Vec<String>,
        /// Current value.
        new: Vec<String>,
    },
    /// The Wi-Fi network changed.
    Ssid {
        /// Previous value.
        old: Option<String>,
        /// Current value.
        new: Option<String>,
    },
    /// Per-interface IPv4 addresses changed.
    Addresses {
        /// Previous value.
        old: BTreeMap<String, Vec<Ipv4Addr>>,
        /// Current value.
        new: BTreeMap<String, Vec<Ipv4Addr>>,
    },
}

impl SnapshotChange {
    /// Name of the field that changed.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Ip { .. } => "ip",
            Self::Interfaces { .. } => "interfaces",
            Self::Ssid { .. } => "ssid",
            Self::Addresses { .. } => "addresses",
        }
    }
}

struct OrNone<'a, T>(&'a Option<T>);

impl<T: fmt::Display> fmt::Display for OrNone<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value}"),
            None => write!(f, "none"),
        }
    }
}

impl fmt::Display for SnapshotChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ip { old, new } => write!(f, "ip: {} -> {}", OrNone(old), OrNone(new)),
            Self::Interfaces { old, new } => write!(f, "interfaces: {old:?} -> {new:?}"),
            Self::Ssid { old, new } => write!(f, "ssid: {} -> {}", OrNone(old), OrNone(new)),
            Self::Addresses { old, new } => write!(f, "addresses: {old:?} -> {new:?}"),
        }
    }
}

/// Holds the last observed snapshot and reports what changed on refresh.
#[derive(Debug, Clone)]
pub struct SnapshotComparator {
    baseline: NetworkSnapshot,
}

impl SnapshotComparator {
    /// Start comparing against `baseline`.
    pub fn new(baseline: NetworkSnapshot) -> Self {
        Self { baseline }
    }

    /// The snapshot the next refresh is compared against.
    pub fn baseline(&self) -> &NetworkSnapshot {
        &self.baseline
    }

    /// Compare `fresh` with the baseline, then make it the new baseline.
    pub fn refresh(&mut self, fresh: NetworkSnapshot) -> Vec<SnapshotChange> {
        let changes = fresh.changes_from(&self.baseline);
        self.baseline = fresh;
        changes
    }
}
