// src/publish/staging.rs

//! Scratch directory handling and assembly of the site build tree.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::ToolsSection;
use crate::fs::FileSystem;
use crate::publish::layout::PublishLayout;

/// Remove `path` if it is present. A symlink is removed, not followed.
pub fn remove_if_present(fs: &dyn FileSystem, path: &Path) -> Result<()> {
    if fs.is_symlink(path) {
        fs.remove_file(path)
    } else if fs.is_dir(path) {
        info!(dir = ?path, "cleaning up");
        fs.remove_dir_all(path)
    } else if fs.exists(path) {
        fs.remove_file(path)
    } else {
        Ok(())
    }
}

/// Remove `path` and recreate it as an empty directory.
pub fn reset_dir(fs: &dyn FileSystem, path: &Path) -> Result<()> {
    remove_if_present(fs, path)?;
    fs.create_dir_all(path)
}

/// Copy the contents of `from` into `to`, merging with what is already there.
///
/// Existing files with the same relative path are overwritten, everything
/// else in `to` is kept. Symlinks are recreated, not followed.
pub fn copy_tree(fs: &dyn FileSystem, from: &Path, to: &Path) -> Result<()> {
    if !fs.is_dir(from) {
        anyhow::bail!("template directory {:?} does not exist", from);
    }
    fs.create_dir_all(to)?;

    let mut stack = vec![(from.to_path_buf(), to.to_path_buf())];
    while let Some((src_dir, dst_dir)) = stack.pop() {
        for src in fs.read_dir(&src_dir)? {
            let Some(name) = src.file_name() else {
                continue;
            };
            let dst = dst_dir.join(name);

            if fs.is_symlink(&src) {
                let target = fs.read_link(&src)?;
                if fs.is_symlink(&dst) || fs.is_file(&dst) {
                    fs.remove_file(&dst)?;
                }
                fs.symlink(&target, &dst)?;
            } else if fs.is_dir(&src) {
                if !fs.is_dir(&dst) {
                    fs.create_dir(&dst)?;
                }
                stack.push((src, dst));
            } else {
                fs.copy_file(&src, &dst)?;
            }
        }
    }
    Ok(())
}

/// Recreate `<temp>/build` from the template: scaffold first, then the
/// template's content merged into `build/content`, plus the empty
/// directories the converter writes into.
pub fn stage_build_dir(fs: &dyn FileSystem, layout: &PublishLayout) -> Result<()> {
    let build_dir = layout.build_dir();
    remove_if_present(fs, &build_dir)?;

    copy_tree(fs, &layout.template_scaffold(), &build_dir)
        .context("copying site scaffold")?;
    copy_tree(fs, &layout.template_content(), &layout.content_dir())
        .context("merging template content")?;

    fs.create_dir_all(&layout.docs_dir())?;
    fs.create_dir_all(&layout.converted_dir())?;
    debug!(dir = ?build_dir, "build directory staged");
    Ok(())
}

/// Copy the converter scripts from the template root into the scratch root,
/// where the converter is executed.
pub fn copy_converter_scripts(
    fs: &dyn FileSystem,
    layout: &PublishLayout,
    tools: &ToolsSection,
) -> Result<()> {
    for script in &tools.converter_scripts {
        info!(script = %script, "copying converter script");
        fs.copy_file(
            &layout.template_dir().join(script),
            &layout.temp_dir().join(script),
        )?;
    }
    Ok(())
}
