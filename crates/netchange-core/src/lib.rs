//! Core primitives for netchange.
//!
//! This crate provides the building blocks the network change detector is
//! assembled from:
//!
//! - **Cancellation**: [`CancellationToken`] for cooperative shutdown of a
//!   background thread, with waits that return early on cancel or wake
//! - **Logging**: tracing targets, span names and a [`PerfSpan`] guard
//!
//! # Example
//!
//! ```
//! use netchange_core::{CancellationToken, WaitOutcome};
//! use std::time::Duration;
//!
//! let token = CancellationToken::new();
//! token.cancel();
//! assert_eq!(token.wait_timeout(Duration::from_secs(60)), WaitOutcome::Cancelled);
//! ```

pub mod cancellation;
pub mod logging;

pub use cancellation::{CancellationToken, WaitOutcome};
pub use logging::PerfSpan;
