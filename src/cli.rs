// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Flags are kebab-case; the underscore spellings of the old deployment
//! scripts (`--input_dir`, `--wait_sec`, ...) are accepted as aliases.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `athens-publish`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "athens-publish",
    version,
    about = "Generates a static website from the latest Athens database dump.",
    long_about = None
)]
pub struct CliArgs {
    /// Directory with Athens database dumps.
    #[arg(long, alias = "input_dir", value_name = "DIR")]
    pub input_dir: PathBuf,

    /// Configuration file (TOML) with a `[build.environment]` table.
    #[arg(long, alias = "config_file", value_name = "PATH", default_value = "config.toml")]
    pub config_file: PathBuf,

    /// Scratch directory for intermediate export and build trees.
    #[arg(long, alias = "temp_dir", value_name = "DIR")]
    pub temp_dir: PathBuf,

    /// Output directory; the site is published at `<out-dir>/public`.
    #[arg(long, alias = "out_dir", value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Path to the athens-export checkout (working directory of the exporter).
    #[arg(long, alias = "athens_export", value_name = "DIR")]
    pub athens_export: PathBuf,

    /// Path to the obsidian-zola checkout (site template and converter).
    #[arg(long, alias = "obsidian_zola", value_name = "DIR")]
    pub obsidian_zola: PathBuf,

    /// How long to wait after a dump was last modified before exporting it.
    ///
    /// Avoids regenerating output from a dump that is still being written.
    #[arg(long, alias = "wait_sec", value_name = "SECS", default_value_t = 300)]
    pub wait_sec: u64,

    /// Time between checks of the input directory.
    #[arg(long, alias = "interval_sec", value_name = "SECS", default_value_t = 10)]
    pub interval_sec: u64,

    /// Enable debug logging (shorthand for `--log-level debug`).
    #[arg(long)]
    pub debug: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// Takes precedence over `--debug` and `ATHENS_PUBLISH_LOG`.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Poll the input directory once and exit.
    #[arg(long)]
    pub once: bool,

    /// Validate config, report what the next poll would do, run nothing.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    pub fn wait_threshold(&self) -> Duration {
        Duration::from_secs(self.wait_sec)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.interval_sec)
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
