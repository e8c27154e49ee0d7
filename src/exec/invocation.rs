// src/exec/invocation.rs

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::types::PublishStage;

/// One external program run, fully described before it is spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Stage this invocation belongs to (used for logs and errors).
    pub stage: PublishStage,
    pub program: String,
    pub args: Vec<OsString>,
    /// Working directory; inherits ours when `None`.
    pub cwd: Option<PathBuf>,
    /// Variables layered over the inherited environment.
    pub env: BTreeMap<String, String>,
    /// Directory the tool is expected to populate, if any.
    pub output: Option<PathBuf>,
}

impl ToolInvocation {
    pub fn new(stage: PublishStage, program: impl Into<String>) -> Self {
        Self {
            stage,
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
            output: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn envs(mut self, env: &BTreeMap<String, String>) -> Self {
        self.env
            .extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn output(mut self, dir: impl AsRef<Path>) -> Self {
        self.output = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Arguments as lossy UTF-8, for assertions and log lines.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Human-readable command line, e.g. `zola --root /tmp/build build`.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in self.args_lossy() {
            line.push(' ');
            line.push_str(&arg);
        }
        line
    }
}
