// src/exec/backend.rs

//! Pluggable tool runner abstraction.
//!
//! The publisher talks to a `ToolRunner` instead of spawning processes
//! itself. Production code uses [`RealToolRunner`](super::RealToolRunner);
//! tests provide a runner that records invocations and fakes their output.

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;

use super::invocation::ToolInvocation;

/// Trait abstracting how external tools are executed.
pub trait ToolRunner: Send {
    /// Run the invocation to completion.
    ///
    /// Must return an error if the tool could not be started, exited with a
    /// non-zero status or exceeded a configured time limit.
    fn run<'a>(
        &'a mut self,
        invocation: &'a ToolInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}
