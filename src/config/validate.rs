// src/config/validate.rs

use std::time::Duration;

use globset::Glob;

use crate::config::model::{ConfigFile, RawConfigFile, ToolsSection};
use crate::errors::{PublishError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = PublishError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let environment = raw
            .build
            .and_then(|build| build.environment)
            .ok_or_else(|| {
                PublishError::ConfigError(
                    "config must contain a [build.environment] table".to_string(),
                )
            })?;

        validate_tools(&raw.tools)?;
        validate_dump_pattern(&raw.pipeline.dump_pattern)?;

        let stage_timeout = match raw.pipeline.stage_timeout.as_deref() {
            Some(s) => Some(parse_duration(s).map_err(|e| {
                PublishError::ConfigError(format!("[pipeline].stage_timeout: {e}"))
            })?),
            None => None,
        };

        Ok(ConfigFile::new_unchecked(
            environment,
            raw.tools,
            raw.pipeline,
            stage_timeout,
        ))
    }
}

fn validate_tools(tools: &ToolsSection) -> Result<()> {
    let programs = [
        ("clojure", &tools.clojure),
        ("export_function", &tools.export_function),
        ("obsidian_export", &tools.obsidian_export),
        ("python", &tools.python),
        ("zola", &tools.zola),
    ];
    for (key, value) in programs {
        if value.trim().is_empty() {
            return Err(PublishError::ConfigError(format!(
                "[tools].{key} must not be empty"
            )));
        }
    }

    if tools.converter_scripts.is_empty() {
        return Err(PublishError::ConfigError(
            "[tools].converter_scripts must list at least one script".to_string(),
        ));
    }
    for script in &tools.converter_scripts {
        if script.is_empty() || script.contains('/') || script.contains('\\') {
            return Err(PublishError::ConfigError(format!(
                "[tools].converter_scripts entry '{script}' must be a plain file name"
            )));
        }
    }

    Ok(())
}

fn validate_dump_pattern(pattern: &str) -> Result<()> {
    if pattern.contains('/') {
        return Err(PublishError::ConfigError(format!(
            "[pipeline].dump_pattern '{pattern}' must match file names, not paths"
        )));
    }
    Glob::new(pattern).map_err(|e| {
        PublishError::ConfigError(format!("[pipeline].dump_pattern '{pattern}': {e}"))
    })?;
    Ok(())
}

/// Parse durations such as `"500ms"`, `"30s"`, `"5m"` or `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration too large: '{}'", s))
}
