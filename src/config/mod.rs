// src/config/mod.rs

//! Configuration loading and validation.
//!
//! - `model.rs`: the TOML-backed data model.
//! - `loader.rs`: reading a config file from disk.
//! - `validate.rs`: turning a `RawConfigFile` into a checked `ConfigFile`.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_from_str};
pub use model::{BuildSection, ConfigFile, PipelineSection, RawConfigFile, ToolsSection};
pub use validate::parse_duration;
