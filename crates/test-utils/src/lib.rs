//! Shared fixtures for the `athens-publish` integration tests: an in-memory
//! deployment ([`builders::MockSite`]), a config builder and a tool runner
//! that fakes `obsidian-export`, the converter and `zola`.

pub mod builders;
pub mod fake_runner;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use athens_publish::logging::LOG_ENV_VAR;
use tracing_subscriber::{fmt, EnvFilter};

/// Upper bound for one async test step. The fake runner never blocks, and the
/// real-process tests use sub-second tools.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Route `tracing` output through the test harness, once per test binary.
///
/// Captured lines are only shown for failing tests (or with `--nocapture`).
/// The filter comes from `ATHENS_PUBLISH_LOG` if set, e.g.
/// `ATHENS_PUBLISH_LOG=athens_publish::publish=debug`, then `RUST_LOG`, and
/// defaults to `info`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, failing the test if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!("test step did not finish within {TEST_TIMEOUT:?}"),
    }
}
