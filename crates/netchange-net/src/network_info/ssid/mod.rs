//! Wi-Fi network name (SSID) resolution.
//!
//! No single API reports the associated SSID across platforms and Linux
//! distributions, so [`SsidResolver`] walks an ordered chain of
//! [`SsidStrategy`] implementations and returns the first name found. Every
//! strategy may fail on its own (utility not installed, not connected,
//! timeout); a failure only means "try the next one".
//!
//! # Default chains
//!
//! | Platform | Strategies, in order |
//! |----------|----------------------|
//! | Linux    | `nmcli`, `wpa_cli`, `iwgetid` |
//! | Windows  | `netsh wlan show interfaces` |
//! | other    | none (always `None`) |
//!
//! # Example
//!
//! ```ignore
//! use netchange_net::network_info::SsidResolver;
//! use std::time::Duration;
//!
//! let resolver = SsidResolver::platform_default(Duration::from_secs(2));
//! if let Some(ssid) = resolver.current_ssid() {
//!     println!("Connected to {ssid}");
//! }
//! ```

mod command;
pub mod parse;

use std::fmt;
use std::time::Duration;

use netchange_core::PerfSpan;
use netchange_core::logging::{span_names, targets};

use crate::config::DEFAULT_COMMAND_TIMEOUT_MS;
use crate::error::ResolverError;

/// One way of finding the current SSID.
///
/// `Ok(None)` means the strategy ran but found no network name; `Err` means
/// it could not run or its tool misbehaved. The chain treats both as
/// "try the next strategy".
pub trait SsidStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Attempt to resolve the SSID.
    fn resolve(&self) -> Result<Option<String>, ResolverError>;
}

/// A strategy that runs an external utility and parses its stdout.
#[derive(Clone)]
pub struct CommandStrategy {
    name: &'static str,
    program: String,
    args: Vec<String>,
    timeout: Duration,
    parse: fn(&str) -> Option<String>,
}

impl CommandStrategy {
    /// Create a strategy running `program args…` and extracting the SSID
    /// with `parse`.
    pub fn new(
        name: &'static str,
        program: impl Into<String>,
        args: &[&str],
        timeout: Duration,
        parse: fn(&str) -> Option<String>,
    ) -> Self {
        Self {
            name,
            program: program.into(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
            timeout,
            parse,
        }
    }

    /// NetworkManager: `nmcli -t -f active,ssid dev wifi`.
    pub fn network_manager(timeout: Duration) -> Self {
        Self::new(
            "network-manager",
            "nmcli",
            &["-t", "-f", "active,ssid", "dev", "wifi"],
            timeout,
            parse::nmcli_active_ssid,
        )
    }

    /// wpa_supplicant: `wpa_cli status`.
    pub fn wpa_supplicant(timeout: Duration) -> Self {
        Self::new(
            "wpa-supplicant",
            "wpa_cli",
            &["status"],
            timeout,
            parse::wpa_cli_ssid,
        )
    }

    /// Wireless tools: `iwgetid -r`.
    pub fn wireless_id(timeout: Duration) -> Self {
        Self::new("iwgetid", "iwgetid", &["-r"], timeout, parse::iwgetid_ssid)
    }

    /// Windows WLAN service: `netsh wlan show interfaces`.
    pub fn netsh(timeout: Duration) -> Self {
        Self::new(
            "netsh",
            "netsh",
            &["wlan", "show", "interfaces"],
            timeout,
            parse::netsh_ssid,
        )
    }

    /// The program this strategy invokes.
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl fmt::Debug for CommandStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandStrategy")
            .field("name", &self.name)
            .field("program", &self.program)
            .field("args", &self.args)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl SsidStrategy for CommandStrategy {
    fn name(&self) -> &str {
        self.name
    }

    fn resolve(&self) -> Result<Option<String>, ResolverError> {
        let stdout = command::run_captured(&self.program, &self.args, self.timeout)?;
        Ok((self.parse)(&stdout))
    }
}

/// Resolves the current SSID through an ordered chain of strategies.
pub struct SsidResolver {
    strategies: Vec<Box<dyn SsidStrategy>>,
}

impl SsidResolver {
    /// Create a resolver trying `strategies` in order.
    pub fn new(strategies: Vec<Box<dyn SsidStrategy>>) -> Self {
        Self { strategies }
    }

    /// The chain for the platform this binary was built for.
    pub fn platform_default(command_timeout: Duration) -> Self {
        Self::new(platform::default_strategies(command_timeout))
    }

    /// Names of the strategies, in the order they are tried.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// The current SSID, or `None` if no strategy found one.
    ///
    /// Stops at the first strategy that yields a non-empty name; later
    /// strategies are not run.
    pub fn current_ssid(&self) -> Option<String> {
        let _span = PerfSpan::new(span_names::SSID_CHAIN);

        for strategy in &self.strategies {
            match strategy.resolve() {
                Ok(Some(ssid)) if !ssid.trim().is_empty() => {
                    tracing::trace!(
                        target: targets::SSID,
                        strategy = strategy.name(),
                        %ssid,
                        "resolved SSID"
                    );
                    return Some(ssid);
                }
                Ok(_) => {
                    tracing::debug!(
                        target: targets::SSID,
                        strategy = strategy.name(),
                        "no SSID reported"
                    );
                }
                Err(err) => {
                    tracing::debug!(
                        target: targets::SSID,
                        strategy = strategy.name(),
                        error = %err,
                        "strategy failed"
                    );
                }
            }
        }

        None
    }
}

impl Default for SsidResolver {
    fn default() -> Self {
        Self::platform_default(Duration::from_millis(DEFAULT_COMMAND_TIMEOUT_MS))
    }
}

impl fmt::Debug for SsidResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SsidResolver")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}

#[cfg(target_os = "linux")]
mod platform {
    use super::*;

    pub fn default_strategies(timeout: Duration) -> Vec<Box<dyn SsidStrategy>> {
        vec![
            Box::new(CommandStrategy::network_manager(timeout)),
            Box::new(CommandStrategy::wpa_supplicant(timeout)),
            Box::new(CommandStrategy::wireless_id(timeout)),
        ]
    }
}

#[cfg(target_os = "windows")]
mod platform {
    use super::*;

    pub fn default_strategies(timeout: Duration) -> Vec<Box<dyn SsidStrategy>> {
        vec![Box::new(CommandStrategy::netsh(timeout))]
    }
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
mod platform {
    use super::*;

    pub fn default_strategies(_timeout: Duration) -> Vec<Box<dyn SsidStrategy>> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A canned strategy that counts how often it runs.
    struct Stub {
        name: &'static str,
        answer: fn() -> Result<Option<String>, ResolverError>,
        calls: Arc<AtomicUsize>,
    }

    impl Stub {
        fn boxed(
            name: &'static str,
            answer: fn() -> Result<Option<String>, ResolverError>,
        ) -> (Box<dyn SsidStrategy>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let stub = Stub {
                name,
                answer,
                calls: calls.clone(),
            };
            (Box::new(stub), calls)
        }
    }

    impl SsidStrategy for Stub {
        fn name(&self) -> &str {
            self.name
        }

        fn resolve(&self) -> Result<Option<String>, ResolverError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.answer)()
        }
    }

    fn not_found() -> Result<Option<String>, ResolverError> {
        Err(ResolverError::CommandNotFound {
            program: "stub".to_string(),
        })
    }

    #[test]
    fn test_first_strategy_wins() {
        let (nm, nm_calls) = Stub::boxed("nm", || Ok(Some("HomeNet".to_string())));
        let (wpa, wpa_calls) = Stub::boxed("wpa", || Ok(Some("OfficeNet".to_string())));
        let (raw, raw_calls) = Stub::boxed("raw", || Ok(Some("Other".to_string())));

        let resolver = SsidResolver::new(vec![nm, wpa, raw]);
        assert_eq!(resolver.current_ssid().as_deref(), Some("HomeNet"));
        assert_eq!(nm_calls.load(Ordering::SeqCst), 1);
        assert_eq!(wpa_calls.load(Ordering::SeqCst), 0);
        assert_eq!(raw_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_falls_through_to_second_strategy() {
        let (nm, nm_calls) = Stub::boxed("nm", || Ok(None));
        let (wpa, wpa_calls) = Stub::boxed("wpa", || Ok(Some("OfficeNet".to_string())));
        let (raw, raw_calls) = Stub::boxed("raw", || Ok(Some("Other".to_string())));

        let resolver = SsidResolver::new(vec![nm, wpa, raw]);
        assert_eq!(resolver.current_ssid().as_deref(), Some("OfficeNet"));
        assert_eq!(nm_calls.load(Ordering::SeqCst), 1);
        assert_eq!(wpa_calls.load(Ordering::SeqCst), 1);
        assert_eq!(raw_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_errors_fall_through() {
        let (nm, _) = Stub::boxed("nm", not_found);
        let (wpa, _) = Stub::boxed("wpa", || {
            Err(ResolverError::Timeout {
                program: "wpa_cli".to_string(),
                timeout: Duration::from_secs(2),
            })
        });
        let (raw, raw_calls) = Stub::boxed("raw", || Ok(Some("Basement".to_string())));

        let resolver = SsidResolver::new(vec![nm, wpa, raw]);
        assert_eq!(resolver.current_ssid().as_deref(), Some("Basement"));
        assert_eq!(raw_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_blank_answer_is_not_a_match() {
        let (nm, _) = Stub::boxed("nm", || Ok(Some("   ".to_string())));
        let (wpa, wpa_calls) = Stub::boxed("wpa", || Ok(Some("OfficeNet".to_string())));

        let resolver = SsidResolver::new(vec![nm, wpa]);
        assert_eq!(resolver.current_ssid().as_deref(), Some("OfficeNet"));
        assert_eq!(wpa_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_all_strategies_fail() {
        let (nm, _) = Stub::boxed("nm", not_found);
        let (wpa, _) = Stub::boxed("wpa", not_found);
        let (raw, _) = Stub::boxed("raw", || Ok(None));

        let resolver = SsidResolver::new(vec![nm, wpa, raw]);
        assert_eq!(resolver.current_ssid(), None);
    }

    #[test]
    fn test_empty_chain() {
        assert_eq!(SsidResolver::new(Vec::new()).current_ssid(), None);
    }

    #[test]
    fn test_missing_executables_resolve_to_none() {
        let timeout = Duration::from_millis(500);
        let resolver = SsidResolver::new(vec![
            Box::new(CommandStrategy::new(
                "missing-a",
                "netchange-missing-nmcli",
                &[],
                timeout,
                parse::nmcli_active_ssid,
            )),
            Box::new(CommandStrategy::new(
                "missing-b",
                "netchange-missing-iwgetid",
                &["-r"],
                timeout,
                parse::iwgetid_ssid,
            )),
        ]);
        assert_eq!(resolver.current_ssid(), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_linux_default_chain_order() {
        let resolver = SsidResolver::platform_default(Duration::from_secs(1));
        assert_eq!(
            resolver.strategy_names(),
            vec!["network-manager", "wpa-supplicant", "iwgetid"]
        );
    }

    #[cfg(target_os = "windows")]
    #[test]
    fn test_windows_default_chain() {
        let resolver = SsidResolver::platform_default(Duration::from_secs(1));
        assert_eq!(resolver.strategy_names(), vec!["netsh"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_strategy_parses_output() {
        let strategy = CommandStrategy::new(
            "echo-wpa",
            "sh",
            &["-c", "printf 'bssid=aa:bb\\nssid=OfficeNet\\n'"],
            Duration::from_secs(5),
            parse::wpa_cli_ssid,
        );
        assert_eq!(strategy.resolve().unwrap().as_deref(), Some("OfficeNet"));
    }
}
