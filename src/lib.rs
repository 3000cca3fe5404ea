//! Vistrigger lets code running in a process ask an out-of-process inspector to take a memory
//! snapshot right now, without any API call into the inspector.
//!
//! ## Handshake
//!
//! The inspector is attached at launch and announces itself with a startup argument such as
//! `-agentpath:/opt/agent/inspector.so`:
//!
//! * [`visualize`] scans the process arguments for that marker, and returns immediately if there
//!   is none
//! * the call site line is written to the handshake file `/opt/agent/inspector.dat`
//! * the signal file `/opt/agent/inspector.sig` is created, the inspector waits for it (see
//!   [`signal`]) and reads the handshake file
//!
//! Failures are logged with `tracing` and never reach the caller: the process being inspected
//! matters more than the snapshot.
//!
//! ## Inspector data
//!
//! [`metrics::MetricsSnapshot`] renders process and system memory counters as text, and
//! [`bridge::Bridge`] turns registered objects into framed payloads.
//!
//! ## Example
//!
//! See demos in the Git repository.
//!
//! * The managed demo triggers a snapshot in a loop and prints its metrics before exiting.
//! * The inspector demo waits for triggers and prints the recorded call site.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod bridge;
pub mod config;
pub mod handshake;
pub mod launch;
pub mod metrics;
pub mod signal;
pub mod trigger;

mod error;
mod internal;

pub use config::TriggerConfig;
pub use error::{Error, Result};
pub use trigger::{visualize, Trigger, TriggerOutcome};
