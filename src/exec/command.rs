// src/exec/command.rs

//! Real process execution via `tokio::process::Command`.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::{PublishError, Result};
use crate::types::PublishStage;

use super::backend::ToolRunner;
use super::invocation::ToolInvocation;

/// How long a killed tool's output may keep draining into the log.
const KILLED_OUTPUT_GRACE: Duration = Duration::from_secs(1);

/// Runs tools as child processes, one at a time.
///
/// Output is streamed into the log: stdout at debug, stderr at info.
#[derive(Debug, Clone, Default)]
pub struct RealToolRunner {
    timeout: Option<Duration>,
}

impl RealToolRunner {
    /// `timeout = None` lets a hung tool block forever.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl ToolRunner for RealToolRunner {
    fn run<'a>(
        &'a mut self,
        invocation: &'a ToolInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        let timeout = self.timeout;
        Box::pin(async move { run_tool(invocation, timeout).await })
    }
}

async fn run_tool(invocation: &ToolInvocation, timeout: Option<Duration>) -> Result<()> {
    info!(
        stage = %invocation.stage,
        cwd = ?invocation.cwd,
        "running {}",
        invocation.command_line()
    );

    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args)
        .envs(&invocation.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(cwd) = &invocation.cwd {
        cmd.current_dir(cwd);
    }

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning `{}`", invocation.program))?;

    let mut forwarders = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        forwarders.push(forward_lines(invocation.stage, stdout, false));
    }
    if let Some(stderr) = child.stderr.take() {
        forwarders.push(forward_lines(invocation.stage, stderr, true));
    }

    let status = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(status) => status?,
            Err(_elapsed) => {
                warn!(
                    stage = %invocation.stage,
                    program = %invocation.program,
                    "time limit exceeded; killing process"
                );
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "failed to kill timed-out process");
                }
                // A grandchild may still hold the pipes open.
                if tokio::time::timeout(KILLED_OUTPUT_GRACE, join_forwarders(forwarders))
                    .await
                    .is_err()
                {
                    debug!(stage = %invocation.stage, "output still open after kill");
                }
                return Err(PublishError::ToolTimeout {
                    stage: invocation.stage,
                    program: invocation.program.clone(),
                    timeout: limit,
                });
            }
        },
        None => child.wait().await?,
    };
    join_forwarders(forwarders).await;

    debug!(
        stage = %invocation.stage,
        program = %invocation.program,
        exit_code = ?status.code(),
        "process exited"
    );

    if !status.success() {
        return Err(PublishError::ToolFailed {
            stage: invocation.stage,
            program: invocation.program.clone(),
            code: status.code(),
        });
    }
    Ok(())
}

/// Consume a child pipe so buffers don't fill, logging each line.
///
/// The task ends at EOF.
fn forward_lines<R>(stage: PublishStage, pipe: R, is_stderr: bool) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(pipe).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if is_stderr {
                info!(stage = %stage, "stderr: {}", line);
            } else {
                debug!(stage = %stage, "stdout: {}", line);
            }
        }
    })
}

async fn join_forwarders(forwarders: Vec<JoinHandle<()>>) {
    for handle in forwarders {
        if let Err(e) = handle.await {
            warn!(error = %e, "output forwarding task failed");
        }
    }
}
