// src/publish/swap.rs

//! Atomic publication of a finished build.
//!
//! `<out>/public` is always a symlink to a complete `public_tmp_*` build.
//! A new build is published by creating `<build>.link` and renaming it onto
//! `public`; rename over an existing symlink is atomic on POSIX filesystems,
//! so readers see either the old or the new build.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use tracing::{debug, info};

use crate::errors::PublishError;
use crate::fs::FileSystem;
use crate::publish::layout::{PublishLayout, LINK_SUFFIX, OUTPUT_PREFIX};
use crate::publish::staging::remove_if_present;

/// Startup check: `public` may be absent or a symlink, nothing else.
/// Creates the output root if needed.
pub fn ensure_output_root(
    fs: &dyn FileSystem,
    layout: &PublishLayout,
) -> std::result::Result<(), PublishError> {
    let published = layout.published_path();
    if !fs.is_symlink(&published) && fs.exists(&published) {
        return Err(PublishError::Precondition(format!(
            "expected {:?} to be a symlink",
            published
        )));
    }

    if !fs.is_dir(layout.out_dir()) {
        info!(dir = ?layout.out_dir(), "creating output directory");
        fs.create_dir_all(layout.out_dir())?;
    }
    Ok(())
}

/// Allocate a fresh, uniquely-named output directory path for the site
/// generator.
///
/// The generator refuses to write into a directory that already exists, so
/// the directory is created only to claim a unique name and then removed
/// again. The returned path does not exist.
pub fn reserve_output_dir(fs: &dyn FileSystem, out_dir: &Path) -> Result<PathBuf> {
    let dir = fs.make_unique_dir(out_dir, OUTPUT_PREFIX)?;
    fs.remove_dir(&dir)?;
    debug!(dir = ?dir, "reserved output directory");
    Ok(dir)
}

/// Point `public` at `output` by renaming a fresh symlink over it.
///
/// The link target is the bare directory name, so the output root can be
/// moved or mounted elsewhere without breaking the link.
pub fn swap_published_link(fs: &dyn FileSystem, layout: &PublishLayout, output: &Path) -> Result<()> {
    let name = output
        .file_name()
        .ok_or_else(|| anyhow!("output directory {:?} has no file name", output))?;

    let mut link_name = name.to_os_string();
    link_name.push(LINK_SUFFIX);
    let link = layout.out_dir().join(link_name);

    // Leftover from an attempt that died between symlink and rename.
    remove_if_present(fs, &link)?;

    fs.symlink(Path::new(name), &link)?;
    fs.rename(&link, &layout.published_path())?;
    info!(public = ?layout.published_path(), target = ?name, "published new build");
    Ok(())
}

/// Remove every `public_tmp_*` entry in `out_dir` except `keep`.
pub fn collect_garbage(fs: &dyn FileSystem, out_dir: &Path, keep: &Path) -> Result<Vec<PathBuf>> {
    let keep_name = keep.file_name();
    let mut removed = Vec::new();

    for path in fs.read_dir(out_dir)? {
        let Some(name) = path.file_name() else {
            continue;
        };
        if !is_output_name(name) || Some(name) == keep_name {
            continue;
        }
        remove_if_present(fs, &path)?;
        removed.push(path);
    }

    Ok(removed)
}

fn is_output_name(name: &OsStr) -> bool {
    name.to_str()
        .is_some_and(|name| name.starts_with(OUTPUT_PREFIX))
}
