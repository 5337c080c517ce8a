//! Logging facilities for netchange.
//!
//! netchange uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Every event carries one of the [`targets`] below, so a filter such as
//! `RUST_LOG=netchange::monitor=info,netchange::ssid=debug` selects a single
//! subsystem.

/// Span names used throughout netchange for tracing.
pub mod span_names {
    /// One iteration of the monitor loop.
    pub const TICK: &str = "netchange::tick";
    /// One run of the SSID strategy chain.
    pub const SSID_CHAIN: &str = "netchange::ssid_chain";
}

/// Target names for log filtering.
pub mod targets {
    /// Monitor lifecycle and detected changes.
    pub const MONITOR: &str = "netchange::monitor";
    /// Wi-Fi network name resolution.
    pub const SSID: &str = "netchange::ssid";
    /// Outbound address resolution.
    pub const ADDRESS: &str = "netchange::address";
    /// Interface enumeration.
    pub const INTERFACES: &str = "netchange::interfaces";
    /// Timing spans from [`PerfSpan`](super::PerfSpan).
    pub const PERF: &str = "netchange::perf";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Used to measure how long an operation such as a monitor tick takes.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_share_prefix() {
        for target in [
            targets::MONITOR,
            targets::SSID,
            targets::ADDRESS,
            targets::INTERFACES,
            targets::PERF,
        ] {
            assert!(target.starts_with("netchange::"));
        }
    }

    #[test]
    fn test_perf_span() {
        // Just ensure it doesn't panic without a subscriber installed
        let _span = PerfSpan::new(span_names::TICK);
    }
}
