// src/engine/poll.rs

use std::time::SystemTime;

use tracing::{error, info};

use crate::errors::Result;
use crate::exec::ToolRunner;
use crate::publish::Publisher;
use crate::types::FailurePolicy;
use crate::watch::{PollDecision, PollState, Watcher};

/// One poll: find the newest dump, apply the debounce policy and publish it
/// if it is ready.
///
/// Returns the state for the next poll. `previous` only advances after a
/// successful publish, or after a failed one under [`FailurePolicy::Skip`].
pub async fn poll_once<R: ToolRunner>(
    watcher: &Watcher,
    publisher: &mut Publisher<R>,
    state: PollState,
    now: SystemTime,
    policy: FailurePolicy,
) -> Result<PollState> {
    let PollDecision::Ready { candidate, age } = watcher.check(&state, now)? else {
        return Ok(state);
    };

    info!(
        dump = ?candidate.path,
        age_secs = age.as_secs(),
        "exporting new dump"
    );

    match publisher.publish(&candidate.path).await {
        Ok(build) => {
            info!(
                dump = ?candidate.path,
                output = ?build.output_dir,
                removed_outputs = build.removed_outputs.len(),
                "finished exporting dump"
            );
            Ok(state.advance(candidate.path))
        }
        Err(err) => match policy {
            FailurePolicy::Abort => Err(err),
            FailurePolicy::Skip => {
                error!(
                    dump = ?candidate.path,
                    error = %err,
                    "export failed; skipping this dump until a newer one appears"
                );
                Ok(state.advance(candidate.path))
            }
        },
    }
}
