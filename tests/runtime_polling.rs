// tests/runtime_polling.rs

mod common;
use crate::common::{
    init_tracing, secs, with_timeout, ConfigFileBuilder, FakeToolRunner, MockSite, TestResult,
    WAIT,
};

use std::time::Duration;

use tokio::sync::mpsc;

use athens_publish::engine::{poll_once, Runtime, RuntimeEvent, RuntimeOptions};
use athens_publish::errors::PublishError;
use athens_publish::fs::FileSystem;
use athens_publish::publish::swap::ensure_output_root;
use athens_publish::types::{FailurePolicy, PublishStage};
use athens_publish::watch::PollState;

fn prepared_site() -> MockSite {
    let site = MockSite::new();
    ensure_output_root(&site.fs, &site.layout).expect("output root");
    site
}

#[tokio::test]
async fn settled_dump_is_exported_exactly_once() -> TestResult {
    init_tracing();
    let site = prepared_site();
    let cfg = ConfigFileBuilder::new().build();
    let runner = FakeToolRunner::new(site.shared_fs());
    let watcher = site.watcher(&cfg, WAIT);
    let mut publisher = site.publisher(runner.clone(), &cfg);
    let dump = site.add_dump("athens.json", secs(400));

    let state = poll_once(
        &watcher,
        &mut publisher,
        PollState::new(),
        site.now,
        FailurePolicy::Abort,
    )
    .await?;
    assert_eq!(state.previous(), Some(dump.as_path()));
    assert_eq!(runner.invocations().len(), 4);
    assert!(site.published_target().is_some());

    // Nothing new: no further tool runs.
    let state = poll_once(
        &watcher,
        &mut publisher,
        state,
        site.now + secs(10),
        FailurePolicy::Abort,
    )
    .await?;
    assert_eq!(state.previous(), Some(dump.as_path()));
    assert_eq!(runner.invocations().len(), 4);
    Ok(())
}

#[tokio::test]
async fn fresh_dump_waits_for_threshold() -> TestResult {
    let site = prepared_site();
    let cfg = ConfigFileBuilder::new().build();
    let runner = FakeToolRunner::new(site.shared_fs());
    let watcher = site.watcher(&cfg, WAIT);
    let mut publisher = site.publisher(runner.clone(), &cfg);
    let dump = site.add_dump("athens.json", secs(100));

    let state = poll_once(
        &watcher,
        &mut publisher,
        PollState::new(),
        site.now,
        FailurePolicy::Abort,
    )
    .await?;
    assert_eq!(state.previous(), None);
    assert!(runner.invocations().is_empty());

    // 200s later the dump is 300s old and gets exported.
    let state = poll_once(
        &watcher,
        &mut publisher,
        state,
        site.now + secs(200),
        FailurePolicy::Abort,
    )
    .await?;
    assert_eq!(state.previous(), Some(dump.as_path()));
    assert_eq!(runner.stages().first(), Some(&PublishStage::Exporting));
    Ok(())
}

#[tokio::test]
async fn newer_dump_replaces_published_site() -> TestResult {
    let site = prepared_site();
    let cfg = ConfigFileBuilder::new().build();
    let runner = FakeToolRunner::new(site.shared_fs());
    let watcher = site.watcher(&cfg, WAIT);
    let mut publisher = site.publisher(runner, &cfg);

    site.add_dump("one.json", secs(1000));
    let state = poll_once(
        &watcher,
        &mut publisher,
        PollState::new(),
        site.now,
        FailurePolicy::Abort,
    )
    .await?;
    let first_target = site.published_target();

    let two = site.add_dump("two.json", secs(500));
    let state = poll_once(&watcher, &mut publisher, state, site.now, FailurePolicy::Abort).await?;

    assert_eq!(state.previous(), Some(two.as_path()));
    assert_ne!(site.published_target(), first_target);
    assert_eq!(site.output_dirs().len(), 1);
    Ok(())
}

#[tokio::test]
async fn abort_policy_propagates_and_keeps_state() -> TestResult {
    let site = prepared_site();
    let cfg = ConfigFileBuilder::new().build();
    let runner = FakeToolRunner::new(site.shared_fs()).failing_at(PublishStage::Converting);
    let watcher = site.watcher(&cfg, WAIT);
    let mut publisher = site.publisher(runner, &cfg);
    site.add_dump("athens.json", secs(400));

    let err = poll_once(
        &watcher,
        &mut publisher,
        PollState::new(),
        site.now,
        FailurePolicy::Abort,
    )
    .await
    .expect_err("abort policy must surface the failure");

    assert!(matches!(
        err,
        PublishError::ToolFailed { stage: PublishStage::Converting, .. }
    ));
    Ok(())
}

#[tokio::test]
async fn skip_policy_quarantines_the_failed_dump() -> TestResult {
    init_tracing();
    let site = prepared_site();
    let cfg = ConfigFileBuilder::new().build();
    let runner = FakeToolRunner::new(site.shared_fs()).failing_at(PublishStage::GeneratingSite);
    let watcher = site.watcher(&cfg, WAIT);
    let mut publisher = site.publisher(runner.clone(), &cfg);
    let bad = site.add_dump("bad.json", secs(400));

    let state = poll_once(
        &watcher,
        &mut publisher,
        PollState::new(),
        site.now,
        FailurePolicy::Skip,
    )
    .await?;
    assert_eq!(state.previous(), Some(bad.as_path()));
    let runs_after_failure = runner.invocations().len();

    // The failed dump is not retried.
    let state = poll_once(&watcher, &mut publisher, state, site.now, FailurePolicy::Skip).await?;
    assert_eq!(runner.invocations().len(), runs_after_failure);

    // A newer dump is picked up once the toolchain works again.
    runner.set_fail_stage(None);
    let good = site.add_dump("good.json", secs(350));
    let state = poll_once(&watcher, &mut publisher, state, site.now, FailurePolicy::Skip).await?;
    assert_eq!(state.previous(), Some(good.as_path()));
    assert!(site.published_target().is_some());
    Ok(())
}

#[tokio::test]
async fn runtime_once_polls_a_single_time() -> TestResult {
    init_tracing();
    let site = prepared_site();
    let cfg = ConfigFileBuilder::new().build();
    let runner = FakeToolRunner::new(site.shared_fs());
    // Real clock here: give the dump an mtime far in the past.
    let dump = site.input_dir.join("athens.json");
    site.fs
        .add_file_with_mtime(&dump, "{}", std::time::SystemTime::UNIX_EPOCH + secs(1));

    let (_tx, rx) = mpsc::channel::<RuntimeEvent>(1);
    let options = RuntimeOptions {
        interval: Duration::from_secs(3600),
        once: true,
        failure_policy: FailurePolicy::Abort,
    };
    let runtime = Runtime::new(
        site.watcher(&cfg, WAIT),
        site.publisher(runner.clone(), &cfg),
        options,
        rx,
    );

    let state = with_timeout(runtime.run()).await?;
    assert_eq!(state.previous(), Some(dump.as_path()));
    assert_eq!(runner.invocations().len(), 4);
    Ok(())
}

#[tokio::test]
async fn runtime_stops_on_shutdown_request() -> TestResult {
    let site = prepared_site();
    let cfg = ConfigFileBuilder::new().build();
    let runner = FakeToolRunner::new(site.shared_fs());

    let (tx, rx) = mpsc::channel::<RuntimeEvent>(1);
    let options = RuntimeOptions {
        interval: Duration::from_millis(20),
        once: false,
        failure_policy: FailurePolicy::Abort,
    };
    let runtime = Runtime::new(
        site.watcher(&cfg, WAIT),
        site.publisher(runner.clone(), &cfg),
        options,
        rx,
    );

    let handle = tokio::spawn(runtime.run());
    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(RuntimeEvent::ShutdownRequested).await?;

    let state = with_timeout(handle).await??;
    assert_eq!(state.previous(), None);
    assert!(runner.invocations().is_empty());
    Ok(())
}

#[tokio::test]
async fn runtime_exits_with_error_under_abort() -> TestResult {
    let site = prepared_site();
    let cfg = ConfigFileBuilder::new().build();
    let runner = FakeToolRunner::new(site.shared_fs()).failing_at(PublishStage::Exporting);
    site.fs.add_file_with_mtime(
        site.input_dir.join("athens.json"),
        "{}",
        std::time::SystemTime::UNIX_EPOCH + secs(1),
    );

    let (_tx, rx) = mpsc::channel::<RuntimeEvent>(1);
    let options = RuntimeOptions {
        interval: Duration::from_millis(10),
        once: false,
        failure_policy: FailurePolicy::Abort,
    };
    let runtime = Runtime::new(
        site.watcher(&cfg, WAIT),
        site.publisher(runner, &cfg),
        options,
        rx,
    );

    let result = with_timeout(runtime.run()).await;
    assert!(matches!(
        result,
        Err(PublishError::ToolFailed { stage: PublishStage::Exporting, .. })
    ));
    Ok(())
}

#[tokio::test]
async fn unmounted_input_dir_keeps_previous_state() -> TestResult {
    let site = prepared_site();
    let cfg = ConfigFileBuilder::new().build();
    let runner = FakeToolRunner::new(site.shared_fs());
    let mut publisher = site.publisher(runner.clone(), &cfg);
    let dump = site.add_dump("athens.json", secs(400));
    let watcher = site.watcher(&cfg, WAIT);

    let state = poll_once(
        &watcher,
        &mut publisher,
        PollState::new(),
        site.now,
        FailurePolicy::Abort,
    )
    .await?;
    assert_eq!(state.previous(), Some(dump.as_path()));
    let runs = runner.invocations().len();

    // The share disappears; polling goes on with the same state.
    site.fs.remove_dir_all(&site.input_dir)?;
    for policy in [FailurePolicy::Abort, FailurePolicy::Skip] {
        let next = poll_once(&watcher, &mut publisher, state.clone(), site.now, policy).await?;
        assert_eq!(next, state);
    }
    assert_eq!(runner.invocations().len(), runs);
    Ok(())
}
