// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`invocation`] describes a single external tool run.
//! - [`backend`] provides the `ToolRunner` trait the publisher depends on.
//! - [`command`] is the production runner built on `tokio::process`.

pub mod backend;
pub mod command;
pub mod invocation;

pub use backend::ToolRunner;
pub use command::RealToolRunner;
pub use invocation::ToolInvocation;
