// src/publish/prune.rs

//! Removal of placeholder notes.
//!
//! Athens exports an empty page as a markdown file holding nothing but
//! bullet markers (`-`), one per line. Those pages must not end up on the
//! site.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info};

use crate::fs::FileSystem;

/// True if every line of `content`, trimmed, is a single `-`.
///
/// Content without any lines counts as a placeholder too.
pub fn is_placeholder_note(content: &str) -> bool {
    content.lines().all(|line| line.trim() == "-")
}

/// Delete every placeholder `.md` file under `root`, recursively.
///
/// Returns the deleted paths. Files with other extensions are left alone.
/// A symlinked note is judged by its target's content and only the link is
/// removed. Symlinked directories are not descended into.
pub fn remove_placeholder_notes(fs: &dyn FileSystem, root: &Path) -> Result<Vec<PathBuf>> {
    let placeholders = find_placeholder_notes(fs, root)?;
    for path in &placeholders {
        info!(file = ?path, "removing empty note");
        fs.remove_file(path)?;
    }
    Ok(placeholders)
}

// Everything is read before anything is removed, so a link and the note it
// points to get the same verdict whatever order they are visited in.
fn find_placeholder_notes(fs: &dyn FileSystem, root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            let is_link = fs.is_symlink(&path);
            if fs.is_dir(&path) {
                if is_link {
                    debug!(dir = ?path, "not following symlinked directory");
                } else {
                    stack.push(path);
                }
                continue;
            }
            if path.extension().is_none_or(|ext| ext != "md") || !fs.is_file(&path) {
                continue;
            }
            if is_placeholder_note(&fs.read_to_string(&path)?) {
                found.push(path);
            }
        }
    }

    Ok(found)
}
