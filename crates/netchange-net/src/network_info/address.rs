//! Outbound address discovery.
//!
//! The address the OS would use to reach the internet is found by connecting
//! a UDP socket to a public address and reading back the local end. UDP
//! `connect` only selects a route; nothing is transmitted.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

use netchange_core::logging::targets;

use crate::config::DEFAULT_PROBE_ADDRESS;
use crate::error::ResolverError;

/// Resolves the local IP address selected for outbound traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressResolver {
    target: SocketAddr,
}

impl AddressResolver {
    /// Create a resolver probing the route towards `target`.
    pub fn new(target: SocketAddr) -> Self {
        Self { target }
    }

    /// The address the probe socket connects to.
    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// The current outbound address, or `None` when there is no route.
    pub fn current_ip(&self) -> Option<IpAddr> {
        match self.try_current_ip() {
            Ok(ip) => Some(ip),
            Err(err) => {
                tracing::debug!(
                    target: targets::ADDRESS,
                    probe = %self.target,
                    error = %err,
                    "outbound address unknown"
                );
                None
            }
        }
    }

    /// The current outbound address, with the reason when it can't be found.
    pub fn try_current_ip(&self) -> Result<IpAddr, ResolverError> {
        let bind_addr = match self.target {
            SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        };

        // The socket is released when it goes out of scope.
        let socket = UdpSocket::bind(bind_addr)?;
        socket.connect(self.target)?;
        let local = socket.local_addr()?.ip();

        if local.is_unspecified() {
            return Err(ResolverError::UnspecifiedAddress(local));
        }
        Ok(local)
    }
}

impl Default for AddressResolver {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_ADDRESS)
    }
}
