// tests/swap_real_fs.rs
//
// Symlink publication against the real filesystem.

#![cfg(unix)]

mod common;
use crate::common::TestResult;

use std::fs;
use std::path::PathBuf;

use athens_publish::errors::PublishError;
use athens_publish::fs::{FileSystem, RealFileSystem};
use athens_publish::publish::swap::{
    collect_garbage, ensure_output_root, reserve_output_dir, swap_published_link,
};
use athens_publish::publish::PublishLayout;

fn layout_in(root: &std::path::Path) -> PublishLayout {
    PublishLayout::new(
        root.join("tmp"),
        root.join("out"),
        root.join("athens-export"),
        root.join("obsidian-zola"),
    )
}

/// What the site generator would do with a reserved directory.
fn generate(dir: &std::path::Path, body: &str) -> TestResult {
    fs::create_dir(dir)?;
    fs::write(dir.join("index.html"), body)?;
    Ok(())
}

#[test]
fn swap_repoints_public_and_gc_keeps_only_current() -> TestResult {
    let root = tempfile::tempdir()?;
    let layout = layout_in(root.path());
    let real = RealFileSystem;
    ensure_output_root(&real, &layout)?;

    let first = reserve_output_dir(&real, layout.out_dir())?;
    assert!(!first.exists(), "reserved dir must be released");
    assert!(first
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("public_tmp_")));
    generate(&first, "one")?;
    swap_published_link(&real, &layout, &first)?;

    let published = layout.published_path();
    assert!(real.is_symlink(&published));
    assert_eq!(fs::read_link(&published)?, PathBuf::from(first.file_name().unwrap()));
    assert_eq!(fs::read_to_string(published.join("index.html"))?, "one");

    let second = reserve_output_dir(&real, layout.out_dir())?;
    assert_ne!(first, second);
    generate(&second, "two")?;
    swap_published_link(&real, &layout, &second)?;
    let removed = collect_garbage(&real, layout.out_dir(), &second)?;

    assert_eq!(removed, vec![first.clone()]);
    assert!(!first.exists());
    assert_eq!(fs::read_to_string(published.join("index.html"))?, "two");

    let mut names: Vec<String> = fs::read_dir(layout.out_dir())?
        .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<_, _>>()?;
    names.sort();
    let second_name = second.file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(names, vec!["public".to_string(), second_name]);
    Ok(())
}

#[test]
fn stale_link_from_interrupted_swap_is_replaced() -> TestResult {
    let root = tempfile::tempdir()?;
    let layout = layout_in(root.path());
    let real = RealFileSystem;
    ensure_output_root(&real, &layout)?;

    let dir = reserve_output_dir(&real, layout.out_dir())?;
    generate(&dir, "site")?;

    let mut stale = dir.clone().into_os_string();
    stale.push(".link");
    std::os::unix::fs::symlink("somewhere-else", &stale)?;

    swap_published_link(&real, &layout, &dir)?;

    assert!(!PathBuf::from(&stale).exists() && !PathBuf::from(&stale).is_symlink());
    assert_eq!(
        fs::read_to_string(layout.published_path().join("index.html"))?,
        "site"
    );
    Ok(())
}

#[test]
fn gc_removes_stray_files_links_and_dirs_with_prefix_only() -> TestResult {
    let root = tempfile::tempdir()?;
    let out = root.path().join("out");
    fs::create_dir_all(out.join("public_tmp_keep"))?;
    fs::create_dir_all(out.join("public_tmp_old/nested"))?;
    fs::write(out.join("public_tmp_old/nested/page.html"), "old")?;
    fs::write(out.join("public_tmp_file"), "stray")?;
    std::os::unix::fs::symlink("public_tmp_keep", out.join("public_tmp_keep.link"))?;
    fs::write(out.join("robots.txt"), "User-agent: *")?;

    let real = RealFileSystem;
    let removed = collect_garbage(&real, &out, &out.join("public_tmp_keep"))?;

    assert_eq!(removed.len(), 3);
    assert!(out.join("public_tmp_keep").is_dir());
    assert!(!out.join("public_tmp_old").exists());
    assert!(!out.join("public_tmp_file").exists());
    assert!(!out.join("public_tmp_keep.link").is_symlink());
    assert!(out.join("robots.txt").exists());
    Ok(())
}

#[test]
fn real_directory_at_public_is_a_precondition_failure() -> TestResult {
    let root = tempfile::tempdir()?;
    let layout = layout_in(root.path());
    fs::create_dir_all(layout.published_path())?;

    let err = ensure_output_root(&RealFileSystem, &layout).expect_err("must be rejected");
    assert!(matches!(err, PublishError::Precondition(_)));
    Ok(())
}
