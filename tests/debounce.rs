// tests/debounce.rs

mod common;
use crate::common::{init_tracing, secs, ConfigFileBuilder, MockSite, TestResult, WAIT};

use std::path::PathBuf;

use athens_publish::watch::{evaluate, Candidate, PollDecision, PollState};

#[test]
fn empty_input_dir_reports_no_dumps() -> TestResult {
    init_tracing();
    let site = MockSite::new();
    let cfg = ConfigFileBuilder::new().build();
    let watcher = site.watcher(&cfg, WAIT);

    let decision = watcher.check(&PollState::new(), site.now)?;
    assert_eq!(decision, PollDecision::NoDumps);
    Ok(())
}

#[test]
fn fresh_dump_is_held_back() -> TestResult {
    init_tracing();
    let site = MockSite::new();
    let cfg = ConfigFileBuilder::new().build();
    let dump = site.add_dump("athens-1.json", secs(100));

    let decision = site.watcher(&cfg, WAIT).check(&PollState::new(), site.now)?;
    match decision {
        PollDecision::TooFresh { candidate, age } => {
            assert_eq!(candidate.path, dump);
            assert_eq!(age, secs(100));
        }
        other => panic!("expected TooFresh, got {other:?}"),
    }
    Ok(())
}

#[test]
fn settled_dump_is_ready() -> TestResult {
    init_tracing();
    let site = MockSite::new();
    let cfg = ConfigFileBuilder::new().build();
    let dump = site.add_dump("athens-1.json", secs(400));

    let decision = site.watcher(&cfg, WAIT).check(&PollState::new(), site.now)?;
    assert!(decision.is_ready());
    if let PollDecision::Ready { candidate, age } = decision {
        assert_eq!(candidate.path, dump);
        assert_eq!(age, secs(400));
    }
    Ok(())
}

#[test]
fn age_equal_to_threshold_is_ready() -> TestResult {
    let site = MockSite::new();
    let cfg = ConfigFileBuilder::new().build();
    site.add_dump("athens-1.json", WAIT);

    let decision = site.watcher(&cfg, WAIT).check(&PollState::new(), site.now)?;
    assert!(decision.is_ready());
    Ok(())
}

#[test]
fn rewritten_dump_waits_again() -> TestResult {
    let site = MockSite::new();
    let cfg = ConfigFileBuilder::new().build();
    let dump = site.add_dump("athens-1.json", secs(1000));
    let watcher = site.watcher(&cfg, WAIT);
    assert!(watcher.check(&PollState::new(), site.now)?.is_ready());

    // Still being synced: the mtime moves forward.
    site.fs.set_modified(&dump, site.now - secs(5));
    let decision = watcher.check(&PollState::new(), site.now)?;
    assert!(matches!(decision, PollDecision::TooFresh { age, .. } if age == secs(5)));
    Ok(())
}

#[test]
fn already_exported_dump_is_unchanged() -> TestResult {
    let site = MockSite::new();
    let cfg = ConfigFileBuilder::new().build();
    let dump = site.add_dump("athens-1.json", secs(4000));

    let state = PollState::with_previous(&dump);
    let decision = site.watcher(&cfg, WAIT).check(&state, site.now)?;
    assert!(matches!(decision, PollDecision::Unchanged(c) if c.path == dump));
    Ok(())
}

#[test]
fn newest_dump_wins_even_if_too_fresh() -> TestResult {
    let site = MockSite::new();
    let cfg = ConfigFileBuilder::new().build();
    site.add_dump("old.json", secs(4000));
    let newest = site.add_dump("new.json", secs(10));

    // Only the newest dump is considered; the older settled one is not a
    // fallback.
    let decision = site.watcher(&cfg, WAIT).check(&PollState::new(), site.now)?;
    assert!(matches!(
        decision,
        PollDecision::TooFresh { ref candidate, .. } if candidate.path == newest
    ));
    Ok(())
}

#[test]
fn non_matching_and_hidden_files_are_ignored() -> TestResult {
    let site = MockSite::new();
    let cfg = ConfigFileBuilder::new().build();
    let dump = site.add_dump("athens.json", secs(1000));
    site.add_dump("notes.txt", secs(500));
    site.add_dump(".athens.json", secs(500));
    site.fs.add_dir(site.input_dir.join("archive.json"));

    let decision = site.watcher(&cfg, WAIT).check(&PollState::new(), site.now)?;
    assert!(matches!(
        decision,
        PollDecision::Ready { ref candidate, .. } if candidate.path == dump
    ));
    Ok(())
}

#[test]
fn custom_dump_pattern_is_honoured() -> TestResult {
    let site = MockSite::new();
    let cfg = ConfigFileBuilder::new()
        .with_dump_pattern("athens-*.edn")
        .build();
    site.add_dump("athens-1.json", secs(1000));
    let dump = site.add_dump("athens-1.edn", secs(2000));

    let decision = site.watcher(&cfg, WAIT).check(&PollState::new(), site.now)?;
    assert!(matches!(
        decision,
        PollDecision::Ready { ref candidate, .. } if candidate.path == dump
    ));
    Ok(())
}

#[test]
fn equal_mtimes_pick_the_greater_path() -> TestResult {
    let site = MockSite::new();
    let cfg = ConfigFileBuilder::new().build();
    site.add_dump("a.json", secs(1000));
    let b = site.add_dump("b.json", secs(1000));

    let watcher = site.watcher(&cfg, WAIT);
    for _ in 0..3 {
        let decision = watcher.check(&PollState::new(), site.now)?;
        assert!(matches!(
            decision,
            PollDecision::Ready { ref candidate, .. } if candidate.path == b
        ));
    }
    Ok(())
}

#[test]
fn future_mtime_counts_as_age_zero() {
    let now = common::fixed_now();
    let candidate = Candidate {
        path: PathBuf::from("/srv/dumps/clock-skew.json"),
        modified: now + secs(60),
    };

    let decision = evaluate(Some(candidate), &PollState::new(), now, WAIT);
    assert!(matches!(decision, PollDecision::TooFresh { age, .. } if age.is_zero()));
}

#[test]
fn zero_wait_publishes_immediately() {
    let now = common::fixed_now();
    let candidate = Candidate {
        path: PathBuf::from("/srv/dumps/a.json"),
        modified: now,
    };

    let decision = evaluate(Some(candidate), &PollState::new(), now, secs(0));
    assert!(decision.is_ready());
}

#[test]
fn missing_input_dir_has_no_dumps() -> TestResult {
    let site = MockSite::new();
    let cfg = ConfigFileBuilder::new().build();
    let matcher = athens_publish::watch::DumpMatcher::new(cfg.dump_pattern()).unwrap();
    let watcher =
        athens_publish::watch::Watcher::new(site.shared_fs(), "/srv/nowhere", matcher, WAIT);

    assert_eq!(
        watcher.check(&PollState::new(), site.now)?,
        PollDecision::NoDumps
    );
    Ok(())
}

#[test]
fn input_path_that_is_a_file_has_no_dumps() -> TestResult {
    let site = MockSite::new();
    site.fs.add_file("/srv/dumps.json", "{}");
    let cfg = ConfigFileBuilder::new().build();
    let matcher = athens_publish::watch::DumpMatcher::new(cfg.dump_pattern()).unwrap();
    let watcher =
        athens_publish::watch::Watcher::new(site.shared_fs(), "/srv/dumps.json", matcher, WAIT);

    assert_eq!(
        watcher.check(&PollState::new(), site.now)?,
        PollDecision::NoDumps
    );
    Ok(())
}
