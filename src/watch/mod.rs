// src/watch/mod.rs

//! Dump discovery and the debounce policy.
//!
//! This module only decides *whether* a dump should be exported; it never
//! runs the export itself (see `engine::poll`).

pub mod candidate;
pub mod poller;

pub use candidate::{latest_dump, list_dumps, Candidate, DumpMatcher};
pub use poller::{evaluate, PollDecision, PollState, Watcher};
