//! Network change monitoring.
//!
//! [`NetworkChangeDetector`] samples the network on a background thread at a
//! fixed interval and calls a user-supplied callback whenever the outbound
//! address, the set of active interfaces or the Wi-Fi network changes.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use netchange_core::logging::{span_names, targets};
use netchange_core::{CancellationToken, PerfSpan, WaitOutcome};
use parking_lot::Mutex;

use super::probe::{NetworkProbe, SystemProbe};
use super::snapshot::{NetworkSnapshot, SnapshotComparator};
use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};

/// Counter for unique detector IDs.
static NEXT_DETECTOR_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// ID of the detector whose loop runs on this thread, if any.
    static LOOP_OWNER: Cell<Option<u64>> = const { Cell::new(None) };
}

type ChangeCallback = Arc<dyn Fn() + Send + Sync>;

/// Result of a call to [`NetworkChangeDetector::start_monitoring`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StartOutcome {
    /// A new monitor loop was started.
    Started,
    /// A loop was already running; nothing changed.
    AlreadyRunning,
}

/// Result of a call to [`NetworkChangeDetector::stop_monitoring`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopOutcome {
    /// The running loop was cancelled and has exited.
    Stopped,
    /// No loop was running; nothing changed.
    AlreadyStopped,
}

enum MonitorState {
    Stopped,
    Running {
        cancellation: CancellationToken,
        handle: JoinHandle<()>,
    },
}

/// Watches the host's network state and reports changes.
///
/// # Example
///
/// ```ignore
/// use netchange_net::NetworkChangeDetector;
/// use std::time::Duration;
///
/// let detector = NetworkChangeDetector::new(|| {
///     println!("network changed, restarting discovery");
/// });
///
/// detector.start_monitoring(Duration::from_secs(2))?;
/// // ...
/// detector.stop_monitoring()?;
/// ```
///
/// # Lifecycle
///
/// `start_monitoring` takes a baseline snapshot on the calling thread and
/// spawns the loop; each tick takes a fresh snapshot, logs every changed
/// field and invokes the callback once if anything changed. Starting twice
/// or stopping twice is a logged no-op. `stop_monitoring` blocks until the
/// loop thread has exited, so the callback never runs after it returns.
///
/// The callback runs on the monitor thread. It must not call
/// `start_monitoring` or `stop_monitoring` on the detector that invoked it;
/// those calls return [`MonitorError::CalledFromMonitorThread`].
pub struct NetworkChangeDetector {
    id: u64,
    config: MonitorConfig,
    probe: Arc<dyn NetworkProbe>,
    on_change: ChangeCallback,
    /// Serializes start and stop; held across the join in `stop_monitoring`.
    lifecycle: Mutex<()>,
    state: Mutex<MonitorState>,
}

impl NetworkChangeDetector {
    /// Create a detector with the default configuration.
    pub fn new<F>(on_change: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::with_config(MonitorConfig::default(), on_change)
    }

    /// Create a detector with a custom configuration.
    pub fn with_config<F>(config: MonitorConfig, on_change: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let probe = SystemProbe::from_config(&config);
        Self::from_parts(config, Arc::new(probe), Arc::new(on_change))
    }

    /// Create a builder for a detector with custom settings.
    pub fn builder() -> NetworkChangeDetectorBuilder {
        NetworkChangeDetectorBuilder::new()
    }

    fn from_parts(
        config: MonitorConfig,
        probe: Arc<dyn NetworkProbe>,
        on_change: ChangeCallback,
    ) -> Self {
        Self {
            id: NEXT_DETECTOR_ID.fetch_add(1, Ordering::Relaxed),
            config,
            probe,
            on_change,
            lifecycle: Mutex::new(()),
            state: Mutex::new(MonitorState::Stopped),
        }
    }

    /// The configuration this detector was built with.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Check if the monitor loop is currently running.
    pub fn is_running(&self) -> bool {
        matches!(*self.state.lock(), MonitorState::Running { .. })
    }

    /// Start monitoring at the configured interval.
    pub fn start(&self) -> Result<StartOutcome> {
        self.start_monitoring(self.config.interval())
    }

    /// Start monitoring, sampling the network every `interval`.
    ///
    /// Returns [`StartOutcome::AlreadyRunning`] without side effects if a
    /// loop is already running.
    pub fn start_monitoring(&self, interval: Duration) -> Result<StartOutcome> {
        if interval.is_zero() {
            return Err(MonitorError::InvalidInterval);
        }
        self.ensure_not_loop_thread()?;

        let _lifecycle = self.lifecycle.lock();
        if self.is_running() {
            tracing::info!(target: targets::MONITOR, "network change detector is already running");
            return Ok(StartOutcome::AlreadyRunning);
        }

        let baseline = self.probe.snapshot();
        tracing::info!(
            target: targets::MONITOR,
            ip = ?baseline.ip,
            interfaces = ?baseline.interfaces,
            ssid = ?baseline.ssid,
            ?interval,
            "starting network change detector"
        );

        let cancellation = CancellationToken::new();
        let monitor_loop = MonitorLoop {
            owner: self.id,
            probe: Arc::clone(&self.probe),
            on_change: Arc::clone(&self.on_change),
            cancellation: cancellation.clone(),
            interval,
            wake_on_os_events: self.config.wake_on_os_events,
        };

        let handle = thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || monitor_loop.run(baseline))
            .map_err(MonitorError::Spawn)?;

        *self.state.lock() = MonitorState::Running {
            cancellation,
            handle,
        };
        Ok(StartOutcome::Started)
    }

    /// Stop monitoring and wait for the loop thread to exit.
    ///
    /// An in-flight tick, including its callback, finishes first. Returns
    /// [`StopOutcome::AlreadyStopped`] if no loop was running.
    pub fn stop_monitoring(&self) -> Result<StopOutcome> {
        self.ensure_not_loop_thread()?;

        let _lifecycle = self.lifecycle.lock();
        let previous = std::mem::replace(&mut *self.state.lock(), MonitorState::Stopped);
        match previous {
            MonitorState::Stopped => {
                tracing::info!(target: targets::MONITOR, "network change detector is already stopped");
                Ok(StopOutcome::AlreadyStopped)
            }
            MonitorState::Running {
                cancellation,
                handle,
            } => {
                tracing::info!(target: targets::MONITOR, "stopping network change detector");
                cancellation.cancel();
                if handle.join().is_err() {
                    tracing::error!(target: targets::MONITOR, "monitor thread panicked");
                }
                tracing::info!(target: targets::MONITOR, "network change detector stopped");
                Ok(StopOutcome::Stopped)
            }
        }
    }

    fn on_loop_thread(&self) -> bool {
        LOOP_OWNER.with(|owner| owner.get() == Some(self.id))
    }

    fn ensure_not_loop_thread(&self) -> Result<()> {
        if self.on_loop_thread() {
            tracing::warn!(
                target: targets::MONITOR,
                "start/stop called from the change callback; ignoring"
            );
            return Err(MonitorError::CalledFromMonitorThread);
        }
        Ok(())
    }
}

impl Drop for NetworkChangeDetector {
    fn drop(&mut self) {
        let state = std::mem::replace(self.state.get_mut(), MonitorState::Stopped);
        if let MonitorState::Running {
            cancellation,
            handle,
        } = state
        {
            cancellation.cancel();
            // Joining our own thread would deadlock; it exits after this tick.
            if !self.on_loop_thread() && handle.join().is_err() {
                tracing::error!(target: targets::MONITOR, "monitor thread panicked");
            }
        }
    }
}

impl std::fmt::Debug for NetworkChangeDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkChangeDetector")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

/// State moved onto the monitor thread.
struct MonitorLoop {
    owner: u64,
    probe: Arc<dyn NetworkProbe>,
    on_change: ChangeCallback,
    cancellation: CancellationToken,
    interval: Duration,
    wake_on_os_events: bool,
}

impl MonitorLoop {
    fn run(self, baseline: NetworkSnapshot) {
        LOOP_OWNER.with(|owner| owner.set(Some(self.owner)));

        // Dropping the handle unsubscribes.
        let _os_events = if self.wake_on_os_events {
            self.watch_os_events()
        } else {
            None
        };

        let mut comparator = SnapshotComparator::new(baseline);
        while !self.cancellation.is_cancelled() {
            self.tick(&mut comparator);

            match self.cancellation.wait_timeout(self.interval) {
                WaitOutcome::Cancelled => break,
                WaitOutcome::Woken => {
                    tracing::debug!(target: targets::MONITOR, "woken early by interface event");
                }
                WaitOutcome::TimedOut => {}
            }
        }

        tracing::debug!(target: targets::MONITOR, "monitor loop exited");
    }

    fn tick(&self, comparator: &mut SnapshotComparator) {
        let _span = PerfSpan::new(span_names::TICK);

        // A failed snapshot skips the tick and keeps the previous baseline.
        let fresh = match panic::catch_unwind(AssertUnwindSafe(|| self.probe.snapshot())) {
            Ok(fresh) => fresh,
            Err(_) => {
                tracing::error!(
                    target: targets::MONITOR,
                    "network probe panicked; skipping this tick"
                );
                return;
            }
        };

        let changes = comparator.refresh(fresh);
        if changes.is_empty() {
            tracing::trace!(target: targets::MONITOR, "no network change");
            return;
        }

        for change in &changes {
            tracing::info!(target: targets::MONITOR, field = change.field(), "[CHANGE] {change}");
        }

        if panic::catch_unwind(AssertUnwindSafe(|| (self.on_change)())).is_err() {
            tracing::error!(
                target: targets::MONITOR,
                "change callback panicked; monitoring continues"
            );
        }
    }

    fn watch_os_events(&self) -> Option<netwatcher::WatchHandle> {
        let waker = self.cancellation.clone();
        match netwatcher::watch_interfaces(move |_update| waker.wake()) {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::warn!(
                    target: targets::MONITOR,
                    error = %err,
                    "interface notifications unavailable; polling only"
                );
                None
            }
        }
    }
}

/// Builder for [`NetworkChangeDetector`]s with custom configuration.
#[derive(Default)]
pub struct NetworkChangeDetectorBuilder {
    config: MonitorConfig,
    probe: Option<Arc<dyn NetworkProbe>>,
}

impl NetworkChangeDetectorBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the interval used by [`NetworkChangeDetector::start`], in seconds.
    pub fn interval_secs(mut self, secs: u64) -> Self {
        self.config.interval_secs = secs;
        self
    }

    /// Set the timeout for each external SSID utility.
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.config.command_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the address the outbound-address probe connects to.
    pub fn probe_address(mut self, address: std::net::SocketAddr) -> Self {
        self.config.probe_address = address;
        self
    }

    /// Track per-interface IPv4 addresses as an additional change dimension.
    pub fn track_interface_addresses(mut self, enabled: bool) -> Self {
        self.config.track_interface_addresses = enabled;
        self
    }

    /// Tick immediately when the OS reports an interface change.
    pub fn wake_on_os_events(mut self, enabled: bool) -> Self {
        self.config.wake_on_os_events = enabled;
        self
    }

    /// Set the monitor thread name.
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.config.thread_name = name.into();
        self
    }

    /// Use a custom snapshot source instead of the OS-backed [`SystemProbe`].
    pub fn probe<P: NetworkProbe>(mut self, probe: P) -> Self {
        self.probe = Some(Arc::new(probe));
        self
    }

    /// Build the detector. Monitoring does not start until
    /// [`start`](NetworkChangeDetector::start) is called.
    pub fn build<F>(self, on_change: F) -> NetworkChangeDetector
    where
        F: Fn() + Send + Sync + 'static,
    {
        let probe = self
            .probe
            .unwrap_or_else(|| Arc::new(SystemProbe::from_config(&self.config)));
        NetworkChangeDetector::from_parts(self.config, probe, Arc::new(on_change))
    }
}
