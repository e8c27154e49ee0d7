// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::types::FailurePolicy;

/// Configuration exactly as deserialized from TOML, before validation.
///
/// The file is usually shared with the site template, so unknown tables and
/// keys are ignored:
///
/// ```toml
/// [build.environment]
/// SITE_URL = "https://notes.example.org"
///
/// [tools]
/// zola = "/usr/local/bin/zola"
///
/// [pipeline]
/// dump_pattern = "*.json"
/// stage_timeout = "30m"
/// on_failure = "abort"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// `[build]`; only `environment` is read.
    #[serde(default)]
    pub build: Option<BuildSection>,

    #[serde(default)]
    pub tools: ToolsSection,

    #[serde(default)]
    pub pipeline: PipelineSection,
}

/// `[build]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildSection {
    /// Environment handed to the converter script.
    ///
    /// `None` when the `[build]` table exists without an `environment` table,
    /// which validation rejects.
    #[serde(default)]
    pub environment: Option<BTreeMap<String, String>>,
}

/// `[tools]` section: names of the external programs in the toolchain.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    #[serde(default = "default_clojure")]
    pub clojure: String,

    /// Clojure function invoked with `-X` to export the Athens dump.
    #[serde(default = "default_export_function")]
    pub export_function: String,

    #[serde(default = "default_obsidian_export")]
    pub obsidian_export: String,

    #[serde(default = "default_python")]
    pub python: String,

    #[serde(default = "default_zola")]
    pub zola: String,

    /// Scripts copied from the template directory into the scratch root.
    /// The first one is executed.
    #[serde(default = "default_converter_scripts")]
    pub converter_scripts: Vec<String>,
}

fn default_clojure() -> String {
    "clojure".to_string()
}

fn default_export_function() -> String {
    "athens.export/export".to_string()
}

fn default_obsidian_export() -> String {
    "obsidian-export".to_string()
}

fn default_python() -> String {
    "python".to_string()
}

fn default_zola() -> String {
    "zola".to_string()
}

fn default_converter_scripts() -> Vec<String> {
    vec!["convert.py".to_string(), "utils.py".to_string()]
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            clojure: default_clojure(),
            export_function: default_export_function(),
            obsidian_export: default_obsidian_export(),
            python: default_python(),
            zola: default_zola(),
            converter_scripts: default_converter_scripts(),
        }
    }
}

impl ToolsSection {
    /// The script passed to the python interpreter.
    pub fn converter_entrypoint(&self) -> &str {
        self.converter_scripts
            .first()
            .map(String::as_str)
            .unwrap_or("convert.py")
    }
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSection {
    /// Glob matched against file names in the input directory.
    #[serde(default = "default_dump_pattern")]
    pub dump_pattern: String,

    /// Optional per-tool time limit, e.g. `"30m"`.
    #[serde(default)]
    pub stage_timeout: Option<String>,

    #[serde(default)]
    pub on_failure: FailurePolicy,
}

fn default_dump_pattern() -> String {
    "*.json".to_string()
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            dump_pattern: default_dump_pattern(),
            stage_timeout: None,
            on_failure: FailurePolicy::default(),
        }
    }
}

/// Validated configuration.
///
/// Only constructed through `TryFrom<RawConfigFile>` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    environment: BTreeMap<String, String>,
    tools: ToolsSection,
    pipeline: PipelineSection,
    stage_timeout: Option<Duration>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        environment: BTreeMap<String, String>,
        tools: ToolsSection,
        pipeline: PipelineSection,
        stage_timeout: Option<Duration>,
    ) -> Self {
        Self {
            environment,
            tools,
            pipeline,
            stage_timeout,
        }
    }

    /// Contents of `[build.environment]`.
    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }

    pub fn tools(&self) -> &ToolsSection {
        &self.tools
    }

    pub fn pipeline(&self) -> &PipelineSection {
        &self.pipeline
    }

    pub fn dump_pattern(&self) -> &str {
        &self.pipeline.dump_pattern
    }

    /// Parsed `[pipeline].stage_timeout`; `None` means tools may run forever.
    pub fn stage_timeout(&self) -> Option<Duration> {
        self.stage_timeout
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.pipeline.on_failure
    }
}
