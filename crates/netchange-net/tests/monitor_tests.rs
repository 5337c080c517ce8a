//! Network change detector lifecycle tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use netchange_net::network_info::{SsidResolver, SsidStrategy, SystemProbe};
use netchange_net::{
    MonitorConfig, MonitorError, NetworkChangeDetector, NetworkSnapshot, ResolverError,
    StartOutcome, StopOutcome,
};
use parking_lot::Mutex;

const TICK: Duration = Duration::from_millis(20);

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("netchange=debug")
        .with_test_writer()
        .try_init();
}

/// A probe whose next snapshot the test controls.
#[derive(Clone, Default)]
struct ScriptedNetwork {
    current: Arc<Mutex<NetworkSnapshot>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedNetwork {
    fn new(initial: NetworkSnapshot) -> Self {
        Self {
            current: Arc::new(Mutex::new(initial)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn set(&self, snapshot: NetworkSnapshot) {
        *self.current.lock() = snapshot;
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn probe(&self) -> impl Fn() -> NetworkSnapshot + Send + Sync + 'static {
        let network = self.clone();
        move || {
            network.calls.fetch_add(1, Ordering::SeqCst);
            network.current.lock().clone()
        }
    }
}

fn counting_callback() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let callback_count = count.clone();
    (count, move || {
        callback_count.fetch_add(1, Ordering::SeqCst);
    })
}

fn wired() -> NetworkSnapshot {
    NetworkSnapshot::new(Some("192.168.1.20".parse().unwrap()), ["eth0", "wlan0"], None)
}

#[test]
fn test_start_twice_runs_one_loop() {
    init_logging();
    let network = ScriptedNetwork::new(wired());
    let detector = NetworkChangeDetector::builder()
        .probe(network.probe())
        .build(|| {});

    assert_eq!(detector.start_monitoring(TICK).unwrap(), StartOutcome::Started);
    assert_eq!(
        detector.start_monitoring(TICK).unwrap(),
        StartOutcome::AlreadyRunning
    );
    assert!(detector.is_running());

    assert_eq!(detector.stop_monitoring().unwrap(), StopOutcome::Stopped);
    assert_eq!(
        detector.stop_monitoring().unwrap(),
        StopOutcome::AlreadyStopped
    );
    assert!(!detector.is_running());
}

#[test]
fn test_stop_without_start() {
    let detector = NetworkChangeDetector::builder()
        .probe(ScriptedNetwork::default().probe())
        .build(|| {});
    assert_eq!(
        detector.stop_monitoring().unwrap(),
        StopOutcome::AlreadyStopped
    );
}

#[test]
fn test_baseline_taken_on_start() {
    let network = ScriptedNetwork::new(wired());
    let detector = NetworkChangeDetector::builder()
        .probe(network.probe())
        .build(|| {});

    detector.start_monitoring(Duration::from_secs(60)).unwrap();
    // Baseline plus the first tick, which runs without waiting.
    thread::sleep(Duration::from_millis(50));
    assert_eq!(network.calls(), 2);
    detector.stop_monitoring().unwrap();
}

#[test]
fn test_no_callback_after_stop() {
    init_logging();
    let network = ScriptedNetwork::new(wired());
    let (count, on_change) = counting_callback();
    let detector = NetworkChangeDetector::builder()
        .probe(network.probe())
        .build(on_change);

    detector.start_monitoring(TICK).unwrap();
    thread::sleep(Duration::from_millis(60));
    detector.stop_monitoring().unwrap();

    let probes_at_stop = network.calls();
    let callbacks_at_stop = count.load(Ordering::SeqCst);

    // Changes after stop are never observed.
    network.set(NetworkSnapshot::default());
    thread::sleep(Duration::from_millis(100));

    assert_eq!(network.calls(), probes_at_stop);
    assert_eq!(count.load(Ordering::SeqCst), callbacks_at_stop);
}

#[test]
fn test_stop_waits_for_in_flight_callback() {
    let network = ScriptedNetwork::new(wired());
    let finished = Arc::new(AtomicBool::new(false));
    let started = Arc::new(AtomicBool::new(false));

    let callback_finished = finished.clone();
    let callback_started = started.clone();
    let detector = NetworkChangeDetector::builder()
        .probe(network.probe())
        .build(move || {
            callback_started.store(true, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(100));
            callback_finished.store(true, Ordering::SeqCst);
        });

    detector.start_monitoring(TICK).unwrap();
    network.set(NetworkSnapshot::default());

    while !started.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(5));
    }
    detector.stop_monitoring().unwrap();
    assert!(finished.load(Ordering::SeqCst));
}

#[test]
fn test_interface_removal_triggers_one_callback() {
    init_logging();
    let network = ScriptedNetwork::new(wired());
    let (count, on_change) = counting_callback();
    let detector = NetworkChangeDetector::builder()
        .probe(network.probe())
        .build(on_change);

    detector.start_monitoring(TICK).unwrap();
    thread::sleep(Duration::from_millis(50));
    assert_eq!(count.load(Ordering::SeqCst), 0);

    let mut unplugged = wired();
    unplugged.interfaces = vec!["wlan0".to_string()];
    network.set(unplugged);
    thread::sleep(Duration::from_millis(100));

    // One change, then the new state is the baseline.
    assert_eq!(count.load(Ordering::SeqCst), 1);
    detector.stop_monitoring().unwrap();
}

#[test]
fn test_unchanged_network_never_calls_back() {
    let network = ScriptedNetwork::new(wired());
    let (count, on_change) = counting_callback();
    let detector = NetworkChangeDetector::builder()
        .probe(network.probe())
        .build(on_change);

    detector.start_monitoring(TICK).unwrap();
    thread::sleep(Duration::from_millis(120));
    detector.stop_monitoring().unwrap();

    assert!(network.calls() >= 3);
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn test_each_change_calls_back_once() {
    let network = ScriptedNetwork::new(wired());
    let (count, on_change) = counting_callback();
    let detector = NetworkChangeDetector::builder()
        .probe(network.probe())
        .build(on_change);

    detector.start_monitoring(TICK).unwrap();
    thread::sleep(Duration::from_millis(50));

    let mut roamed = wired();
    roamed.ssid = Some("OfficeNet".to_string());
    network.set(roamed);
    thread::sleep(Duration::from_millis(80));

    network.set(wired());
    thread::sleep(Duration::from_millis(80));
    detector.stop_monitoring().unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn test_panicking_callback_keeps_monitoring() {
    init_logging();
    let network = ScriptedNetwork::new(wired());
    let calls = Arc::new(AtomicUsize::new(0));
    let callback_calls = calls.clone();
    let detector = NetworkChangeDetector::builder()
        .probe(network.probe())
        .build(move || {
            callback_calls.fetch_add(1, Ordering::SeqCst);
            panic!("restart failed");
        });

    detector.start_monitoring(TICK).unwrap();
    thread::sleep(Duration::from_millis(50));

    network.set(NetworkSnapshot::default());
    thread::sleep(Duration::from_millis(80));
    network.set(wired());
    thread::sleep(Duration::from_millis(80));

    assert!(detector.is_running());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(detector.stop_monitoring().unwrap(), StopOutcome::Stopped);
}

#[test]
fn test_zero_interval_is_rejected() {
    let detector = NetworkChangeDetector::builder()
        .probe(ScriptedNetwork::default().probe())
        .build(|| {});
    assert!(matches!(
        detector.start_monitoring(Duration::ZERO),
        Err(MonitorError::InvalidInterval)
    ));
    assert!(!detector.is_running());
}

#[test]
fn test_start_uses_configured_interval() {
    let config = MonitorConfig::from_toml_str("interval_secs = 1").unwrap();
    let network = ScriptedNetwork::new(wired());
    let detector = NetworkChangeDetector::builder()
        .config(config)
        .probe(network.probe())
        .build(|| {});

    assert_eq!(detector.start().unwrap(), StartOutcome::Started);
    thread::sleep(Duration::from_millis(100));
    // Baseline and first tick only; the next tick is a second away.
    assert_eq!(network.calls(), 2);
    detector.stop_monitoring().unwrap();
}

#[test]
fn test_restart_after_stop() {
    let network = ScriptedNetwork::new(wired());
    let detector = NetworkChangeDetector::builder()
        .probe(network.probe())
        .build(|| {});

    assert_eq!(detector.start_monitoring(TICK).unwrap(), StartOutcome::Started);
    assert_eq!(detector.stop_monitoring().unwrap(), StopOutcome::Stopped);
    assert_eq!(detector.start_monitoring(TICK).unwrap(), StartOutcome::Started);
    assert!(detector.is_running());
    assert_eq!(detector.stop_monitoring().unwrap(), StopOutcome::Stopped);
}

struct MissingTool(&'static str);

impl SsidStrategy for MissingTool {
    fn name(&self) -> &str {
        self.0
    }

    fn resolve(&self) -> Result<Option<String>, ResolverError> {
        Err(ResolverError::CommandNotFound {
            program: self.0.to_string(),
        })
    }
}

#[test]
fn test_missing_ssid_tools_keep_loop_ticking() {
    init_logging();
    let resolver = SsidResolver::new(vec![
        Box::new(MissingTool("nmcli")),
        Box::new(MissingTool("wpa_cli")),
        Box::new(MissingTool("iwgetid")),
    ]);
    let probe = SystemProbe::new().with_ssid_resolver(resolver);

    let ticks = Arc::new(AtomicUsize::new(0));
    let probe_ticks = ticks.clone();
    let detector = NetworkChangeDetector::builder()
        .probe(move || {
            probe_ticks.fetch_add(1, Ordering::SeqCst);
            let snapshot = netchange_net::NetworkProbe::snapshot(&probe);
            assert_eq!(snapshot.ssid, None);
            snapshot
        })
        .build(|| {});

    detector.start_monitoring(TICK).unwrap();
    thread::sleep(Duration::from_millis(120));
    assert!(detector.is_running());
    detector.stop_monitoring().unwrap();

    assert!(ticks.load(Ordering::SeqCst) >= 3);
}

#[test]
fn test_panicking_probe_skips_tick_and_keeps_baseline() {
    init_logging();
    let calls = Arc::new(AtomicUsize::new(0));
    let probe_calls = calls.clone();
    let (count, on_change) = counting_callback();

    // Call 0 is the baseline, call 1 panics, later calls report the baseline.
    let detector = NetworkChangeDetector::builder()
        .probe(move || {
            if probe_calls.fetch_add(1, Ordering::SeqCst) == 1 {
                panic!("interface enumeration failed");
            }
            wired()
        })
        .build(on_change);

    detector.start_monitoring(TICK).unwrap();
    thread::sleep(Duration::from_millis(150));

    assert!(detector.is_running());
    assert!(calls.load(Ordering::SeqCst) >= 4, "loop stopped ticking");
    // The skipped tick must not count as a change against the next sample.
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(detector.stop_monitoring().unwrap(), StopOutcome::Stopped);
}

#[test]
fn test_wake_on_os_events_start_and_stop() {
    init_logging();
    let network = ScriptedNetwork::new(wired());
    let detector = NetworkChangeDetector::builder()
        .wake_on_os_events(true)
        .probe(network.probe())
        .build(|| {});
    assert!(detector.config().wake_on_os_events);

    // Works whether or not interface notifications are available here.
    assert_eq!(
        detector.start_monitoring(Duration::from_secs(60)).unwrap(),
        StartOutcome::Started
    );
    thread::sleep(Duration::from_millis(50));
    assert!(detector.is_running());
    assert!(network.calls() >= 2);

    let stop_started = std::time::Instant::now();
    assert_eq!(detector.stop_monitoring().unwrap(), StopOutcome::Stopped);
    assert!(stop_started.elapsed() < Duration::from_secs(5));
    assert!(!detector.is_running());
}
