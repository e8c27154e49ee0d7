// src/logging.rs

//! Log output for the poller and the tools it runs.
//!
//! Every line goes to stderr. Tool stdout is logged at debug and tool stderr
//! at info (see `exec::command`), so `--debug` is what shows a full
//! `obsidian-export`/`zola` transcript.
//!
//! The level is taken from `--log-level`, then `--debug`, then
//! `ATHENS_PUBLISH_LOG`; anything unrecognised falls back to `info`.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Environment variable consulted when no level is given on the CLI.
pub const LOG_ENV_VAR: &str = "ATHENS_PUBLISH_LOG";

/// Install the global subscriber. Call once, from `main`.
pub fn init_logging(cli_level: Option<LogLevel>, debug: bool) -> Result<()> {
    let env_level = std::env::var(LOG_ENV_VAR).ok();
    let level = resolve_level(cli_level, debug, env_level.as_deref());

    fmt()
        .with_max_level(level)
        .with_target(level >= Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(%level, "logging initialised");
    Ok(())
}

/// Pick the effective level from the CLI flags and the env var value.
pub fn resolve_level(cli_level: Option<LogLevel>, debug: bool, env_level: Option<&str>) -> Level {
    match (cli_level, debug) {
        (Some(lvl), _) => lvl.into(),
        (None, true) => Level::DEBUG,
        (None, false) => env_level.and_then(parse_env_level).unwrap_or(Level::INFO),
    }
}

impl From<LogLevel> for Level {
    fn from(lvl: LogLevel) -> Self {
        match lvl {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

// `Level::from_str` knows the five names (any case) but not "warning".
fn parse_env_level(s: &str) -> Option<Level> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("warning") {
        return Some(Level::WARN);
    }
    s.parse().ok()
}
