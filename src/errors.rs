// src/errors.rs

//! Crate-wide error type.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::types::PublishStage;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("{stage}: `{program}` exited with {}", exit_code_label(.code))]
    ToolFailed {
        stage: PublishStage,
        program: String,
        code: Option<i32>,
    },

    #[error("{stage}: `{program}` did not finish within {timeout:?}")]
    ToolTimeout {
        stage: PublishStage,
        program: String,
        timeout: Duration,
    },

    #[error("{stage}: expected output {path:?} was not produced")]
    MissingOutput { stage: PublishStage, path: PathBuf },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (killed by signal)".to_string(),
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PublishError>;
