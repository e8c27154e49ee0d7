// src/watch/poller.rs

//! Debounce policy for deciding when a dump is final.
//!
//! [`evaluate`] is pure: it only looks at the newest candidate, the poll
//! state and the clock, so the policy can be tested without a filesystem.
//! [`Watcher`] wraps it with directory listing.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::Result;
use tracing::debug;

use crate::fs::FileSystem;
use crate::watch::candidate::{latest_dump, Candidate, DumpMatcher};

/// State threaded through consecutive polls: the last dump that was
/// successfully exported (or quarantined).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
    previous: Option<PathBuf>,
}

impl PollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_previous(path: impl Into<PathBuf>) -> Self {
        Self {
            previous: Some(path.into()),
        }
    }

    pub fn previous(&self) -> Option<&Path> {
        self.previous.as_deref()
    }

    /// State after `path` has been handled.
    pub fn advance(self, path: impl Into<PathBuf>) -> Self {
        Self::with_previous(path)
    }
}

/// Outcome of one debounce evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollDecision {
    /// The input directory holds no dumps.
    NoDumps,
    /// The newest dump was already exported.
    Unchanged(Candidate),
    /// The newest dump was modified less than the wait threshold ago and may
    /// still be being written.
    TooFresh { candidate: Candidate, age: Duration },
    /// The newest dump is new and has been stable long enough.
    Ready { candidate: Candidate, age: Duration },
}

impl PollDecision {
    pub fn is_ready(&self) -> bool {
        matches!(self, PollDecision::Ready { .. })
    }
}

/// Apply the debounce policy to the newest candidate.
///
/// A modification time in the future counts as age zero.
pub fn evaluate(
    latest: Option<Candidate>,
    state: &PollState,
    now: SystemTime,
    wait: Duration,
) -> PollDecision {
    let Some(candidate) = latest else {
        return PollDecision::NoDumps;
    };

    if state.previous() == Some(candidate.path.as_path()) {
        return PollDecision::Unchanged(candidate);
    }

    let age = now
        .duration_since(candidate.modified)
        .unwrap_or(Duration::ZERO);
    if age < wait {
        PollDecision::TooFresh { candidate, age }
    } else {
        PollDecision::Ready { candidate, age }
    }
}

/// Polls one input directory for dumps.
#[derive(Debug, Clone)]
pub struct Watcher {
    fs: Arc<dyn FileSystem>,
    input_dir: PathBuf,
    matcher: DumpMatcher,
    wait: Duration,
}

impl Watcher {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        input_dir: impl Into<PathBuf>,
        matcher: DumpMatcher,
        wait: Duration,
    ) -> Self {
        Self {
            fs,
            input_dir: input_dir.into(),
            matcher,
            wait,
        }
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn wait_threshold(&self) -> Duration {
        self.wait
    }

    /// List the input directory and decide what to do with its newest dump.
    pub fn check(&self, state: &PollState, now: SystemTime) -> Result<PollDecision> {
        let latest = latest_dump(self.fs.as_ref(), &self.input_dir, &self.matcher)?;
        let decision = evaluate(latest, state, now, self.wait);

        match &decision {
            PollDecision::NoDumps => {
                debug!(dir = ?self.input_dir, pattern = self.matcher.pattern(), "no dumps found");
            }
            PollDecision::Unchanged(candidate) => {
                debug!(dump = ?candidate.path, "latest dump has not changed");
            }
            PollDecision::TooFresh { candidate, age } => {
                debug!(
                    dump = ?candidate.path,
                    age_secs = age.as_secs(),
                    wait_secs = self.wait.as_secs(),
                    "latest dump is too fresh"
                );
            }
            PollDecision::Ready { .. } => {}
        }

        Ok(decision)
    }
}
