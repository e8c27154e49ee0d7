// src/watch/candidate.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::fs::FileSystem;

/// A dump file seen in the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Decides which directory entries count as dumps.
///
/// Matches file names only (the input directory is not searched
/// recursively). Like a shell glob, `*` does not match a leading dot, so
/// editor swap files and hidden partial downloads are skipped unless the
/// pattern itself starts with a dot.
#[derive(Clone)]
pub struct DumpMatcher {
    pattern: String,
    matcher: GlobMatcher,
}

impl fmt::Debug for DumpMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DumpMatcher")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

impl DumpMatcher {
    pub fn new(pattern: &str) -> Result<Self> {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid dump pattern: {pattern}"))?;
        Ok(Self {
            pattern: pattern.to_string(),
            matcher: glob.compile_matcher(),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches_name(&self, name: &str) -> bool {
        if name.starts_with('.') && !self.pattern.starts_with('.') {
            return false;
        }
        self.matcher.is_match(name)
    }
}

/// List every dump in `dir` with its modification time.
///
/// A missing input directory (e.g. an unmounted share) holds no dumps.
pub fn list_dumps(fs: &dyn FileSystem, dir: &Path, matcher: &DumpMatcher) -> Result<Vec<Candidate>> {
    if !fs.is_dir(dir) {
        debug!(dir = ?dir, "input directory missing or not a directory");
        return Ok(Vec::new());
    }

    let mut dumps = Vec::new();
    for path in fs.read_dir(dir)? {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !matcher.matches_name(name) || !fs.is_file(&path) {
            continue;
        }
        let modified = fs.modified(&path)?;
        dumps.push(Candidate { path, modified });
    }
    Ok(dumps)
}

/// The most recently modified dump in `dir`, if any.
///
/// Equal mtimes are broken by the greater path so the choice is stable
/// across polls.
pub fn latest_dump(
    fs: &dyn FileSystem,
    dir: &Path,
    matcher: &DumpMatcher,
) -> Result<Option<Candidate>> {
    let dumps = list_dumps(fs, dir, matcher)?;
    Ok(dumps
        .into_iter()
        .max_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.path.cmp(&b.path))))
}
