// src/engine/mod.rs

//! The single sequential loop tying the watcher to the publisher.
//!
//! - [`poll`] performs one poll-and-maybe-publish step with explicit state.
//! - [`runtime`] repeats it every interval until shutdown.

use std::time::Duration;

use crate::types::FailurePolicy;

/// Runtime options.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// Pause between polls.
    pub interval: Duration,
    /// Exit after the first poll (used for `--once`).
    pub once: bool,
    pub failure_policy: FailurePolicy,
}

/// Events flowing into the runtime from outside the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod poll;
pub mod runtime;

pub use poll::poll_once;
pub use runtime::Runtime;
