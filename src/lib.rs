// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod publish;
pub mod types;
pub mod watch;

use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::mpsc;
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{load_and_validate, ConfigFile};
use crate::engine::{Runtime, RuntimeEvent, RuntimeOptions};
use crate::errors::{PublishError, Result};
use crate::exec::RealToolRunner;
use crate::fs::{FileSystem, RealFileSystem};
use crate::publish::swap::ensure_output_root;
use crate::publish::{PublishLayout, Publisher};
use crate::watch::{DumpMatcher, PollDecision, PollState, Watcher};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and startup checks
/// - watcher (dump discovery + debounce)
/// - publisher with the real process runner
/// - the polling runtime
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    if args.interval_sec == 0 {
        return Err(PublishError::ConfigError(
            "--interval-sec must be at least 1".to_string(),
        ));
    }

    let cfg = load_and_validate(&args.config_file)?;
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let layout = PublishLayout::from_args(&args);

    let matcher = DumpMatcher::new(cfg.dump_pattern())?;
    let watcher = Watcher::new(
        Arc::clone(&fs),
        &args.input_dir,
        matcher,
        args.wait_threshold(),
    );

    if args.dry_run {
        print_dry_run(&args, &cfg, &layout, &watcher)?;
        return Ok(());
    }

    ensure_output_root(fs.as_ref(), &layout)?;

    let runner = RealToolRunner::new(cfg.stage_timeout());
    let publisher = Publisher::new(Arc::clone(&fs), runner, layout, &cfg);

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(4);

    // Ctrl-C → graceful shutdown between polls.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let options = RuntimeOptions {
        interval: args.poll_interval(),
        once: args.once,
        failure_policy: cfg.failure_policy(),
    };

    let runtime = Runtime::new(watcher, publisher, options, rt_rx);
    let state = runtime.run().await?;
    debug!(previous = ?state.previous(), "runtime finished");

    drop(rt_tx);
    Ok(())
}

/// Print the effective settings and what the next poll would do.
fn print_dry_run(
    args: &CliArgs,
    cfg: &ConfigFile,
    layout: &PublishLayout,
    watcher: &Watcher,
) -> Result<()> {
    println!("athens-publish dry-run");
    println!("  config_file = {}", args.config_file.display());
    println!("  input_dir = {}", watcher.input_dir().display());
    println!("  dump_pattern = {}", cfg.dump_pattern());
    println!("  wait_sec = {}", args.wait_sec);
    println!("  interval_sec = {}", args.interval_sec);
    println!("  on_failure = {:?}", cfg.failure_policy());
    match cfg.stage_timeout() {
        Some(t) => println!("  stage_timeout = {t:?}"),
        None => println!("  stage_timeout = none"),
    }
    println!();

    println!("paths:");
    println!("  export = {}", layout.export_dir().display());
    println!("  build = {}", layout.build_dir().display());
    println!("  template = {}", layout.template_dir().display());
    println!("  exporter = {}", layout.exporter_dir().display());
    println!("  published = {}", layout.published_path().display());
    println!();

    let tools = cfg.tools();
    println!("tools:");
    println!("  exporter = {} -X {}", tools.clojure, tools.export_function);
    println!("  obsidian_export = {}", tools.obsidian_export);
    println!(
        "  converter = {} {}",
        tools.python,
        tools.converter_entrypoint()
    );
    println!("  site_generator = {}", tools.zola);
    let keys: Vec<&str> = cfg.environment().keys().map(String::as_str).collect();
    println!("  build.environment keys = {keys:?}");
    println!();

    match watcher.check(&PollState::new(), SystemTime::now())? {
        PollDecision::NoDumps => println!("next poll: no dumps found"),
        PollDecision::Unchanged(c) => println!("next poll: {} unchanged", c.path.display()),
        PollDecision::TooFresh { candidate, age } => println!(
            "next poll: {} too fresh ({}s old, waiting for {}s)",
            candidate.path.display(),
            age.as_secs(),
            args.wait_sec
        ),
        PollDecision::Ready { candidate, age } => println!(
            "next poll: would export {} ({}s old)",
            candidate.path.display(),
            age.as_secs()
        ),
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
