#![allow(dead_code)]

use std::error::Error;
use std::time::Duration;

pub use athens_publish_test_utils::builders::{fixed_now, ConfigFileBuilder, MockSite};
pub use athens_publish_test_utils::fake_runner::FakeToolRunner;
pub use athens_publish_test_utils::{init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn Error>>;

/// The default debounce threshold (`--wait-sec 300`).
pub const WAIT: Duration = Duration::from_secs(300);

pub fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}
