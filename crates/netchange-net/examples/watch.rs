//! Network change watcher example.
//!
//! Starts a detector whose callback stands in for restarting a zeroconf
//! responder, then waits for `stop` on stdin.
//!
//! Run with: cargo run -p netchange-net --example watch [config.toml]
//!
//! Set `RUST_LOG=netchange=debug` to also see resolver failures.

use std::io::{self, BufRead};

use netchange_net::{MonitorConfig, NetworkChangeDetector};
use tracing_subscriber::EnvFilter;

fn restart_zeroconf() {
    println!("Network changed: restarting zeroconf service");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => MonitorConfig::load(path)?,
        None => MonitorConfig::default(),
    };

    println!("Starting Network Change Detector (NCD)...");
    let detector = NetworkChangeDetector::with_config(config, restart_zeroconf);
    detector.start()?;

    println!("Type 'stop' to exit.");
    for line in io::stdin().lock().lines() {
        let line = line?;
        let command = line.trim();
        if command.eq_ignore_ascii_case("stop") {
            break;
        }
        if !command.is_empty() {
            println!("Unknown command: {command}");
        }
    }

    detector.stop_monitoring()?;
    Ok(())
}
