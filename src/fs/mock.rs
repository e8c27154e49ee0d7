// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, bail, Result};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

/// Maximum number of symlinks followed while resolving one path.
const MAX_SYMLINK_HOPS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEntry {
    File {
        content: Vec<u8>,
        modified: SystemTime,
    },
    Dir,
    Symlink(PathBuf),
}

type Entries = BTreeMap<PathBuf, MockEntry>;

/// In-memory filesystem with POSIX-like symlink and rename semantics.
///
/// Parent directories are created implicitly by the `add_*` helpers, but the
/// `FileSystem` methods behave like `std::fs` and fail when a parent is
/// missing.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<Entries>>,
    next_unique: Arc<AtomicU64>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.add_file_with_mtime(path, content, SystemTime::now());
    }

    pub fn add_file_with_mtime(
        &self,
        path: impl AsRef<Path>,
        content: impl Into<Vec<u8>>,
        modified: SystemTime,
    ) {
        let path = path.as_ref();
        let mut entries = self.lock();
        ensure_parents(&mut entries, path);
        entries.insert(
            path.to_path_buf(),
            MockEntry::File {
                content: content.into(),
                modified,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut entries = self.lock();
        ensure_parents(&mut entries, path);
        entries.insert(path.to_path_buf(), MockEntry::Dir);
    }

    pub fn add_symlink(&self, link: impl AsRef<Path>, target: impl Into<PathBuf>) {
        let link = link.as_ref();
        let mut entries = self.lock();
        ensure_parents(&mut entries, link);
        entries.insert(link.to_path_buf(), MockEntry::Symlink(target.into()));
    }

    pub fn set_modified(&self, path: impl AsRef<Path>, when: SystemTime) {
        let mut entries = self.lock();
        let resolved = resolve(&entries, path.as_ref());
        if let Some(MockEntry::File { modified, .. }) = entries.get_mut(&resolved) {
            *modified = when;
        }
    }

    /// Raw entry at `path`, without following a final symlink.
    pub fn entry(&self, path: impl AsRef<Path>) -> Option<MockEntry> {
        let entries = self.lock();
        entries.get(&resolve_parent(&entries, path.as_ref())).cloned()
    }

    /// Every path currently stored, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn ensure_parents(entries: &mut Entries, path: &Path) {
    for ancestor in path.ancestors().skip(1) {
        if ancestor.as_os_str().is_empty() {
            continue;
        }
        entries
            .entry(ancestor.to_path_buf())
            .or_insert(MockEntry::Dir);
    }
}

/// Follow symlinks in every component of `path`.
fn resolve(entries: &Entries, path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in path.components() {
        resolved.push(component);
        resolved = follow(entries, resolved);
    }
    resolved
}

/// Follow symlinks in the parent of `path`, but not in its final component.
fn resolve_parent(entries: &Entries, path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => resolve(entries, parent).join(name),
        _ => path.to_path_buf(),
    }
}

fn follow(entries: &Entries, mut path: PathBuf) -> PathBuf {
    for _ in 0..MAX_SYMLINK_HOPS {
        let Some(MockEntry::Symlink(target)) = entries.get(&path) else {
            return path;
        };
        path = if target.is_absolute() {
            target.clone()
        } else {
            let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
            normalize(&base.join(target))
        };
    }
    path
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn parent_is_dir(entries: &Entries, path: &Path) -> bool {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            matches!(entries.get(&resolve(entries, parent)), Some(MockEntry::Dir))
        }
        _ => true,
    }
}

fn has_children(entries: &Entries, path: &Path) -> bool {
    entries.keys().any(|k| k.parent() == Some(path))
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let entries = self.lock();
        match entries.get(&resolve(&entries, path)) {
            Some(MockEntry::File { content, .. }) => {
                String::from_utf8(content.clone()).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(_) => Err(anyhow!("Not a file: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let mut entries = self.lock();
        let target = resolve(&entries, path);
        ensure_parents(&mut entries, &target);
        if matches!(entries.get(&target), Some(MockEntry::Dir)) {
            bail!("Is a directory: {:?}", path);
        }
        entries.insert(
            target,
            MockEntry::File {
                content: contents.to_vec(),
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let entries = self.lock();
        entries.contains_key(&resolve(&entries, path))
    }

    fn is_file(&self, path: &Path) -> bool {
        let entries = self.lock();
        matches!(
            entries.get(&resolve(&entries, path)),
            Some(MockEntry::File { .. })
        )
    }

    fn is_dir(&self, path: &Path) -> bool {
        let entries = self.lock();
        matches!(entries.get(&resolve(&entries, path)), Some(MockEntry::Dir))
    }

    fn is_symlink(&self, path: &Path) -> bool {
        let entries = self.lock();
        matches!(
            entries.get(&resolve_parent(&entries, path)),
            Some(MockEntry::Symlink(_))
        )
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let entries = self.lock();
        let dir = resolve(&entries, path);
        if !matches!(entries.get(&dir), Some(MockEntry::Dir)) {
            bail!("Not a directory or not found: {:?}", path);
        }
        Ok(entries
            .keys()
            .filter(|k| k.parent() == Some(dir.as_path()))
            .filter_map(|k| k.file_name())
            .map(|name| path.join(name))
            .collect())
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        let entries = self.lock();
        match entries.get(&resolve(&entries, path)) {
            Some(MockEntry::File { modified, .. }) => Ok(*modified),
            Some(_) => Ok(SystemTime::UNIX_EPOCH),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        let mut entries = self.lock();
        let target = resolve_parent(&entries, path);
        if entries.contains_key(&target) {
            bail!("Already exists: {:?}", path);
        }
        if !parent_is_dir(&entries, &target) {
            bail!("Parent directory missing: {:?}", path);
        }
        entries.insert(target, MockEntry::Dir);
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut entries = self.lock();
        let target = resolve(&entries, path);
        for ancestor in target.ancestors().collect::<Vec<_>>().into_iter().rev() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            match entries.get(ancestor) {
                Some(MockEntry::Dir) => {}
                Some(_) => bail!("Not a directory: {:?}", ancestor),
                None => {
                    entries.insert(ancestor.to_path_buf(), MockEntry::Dir);
                }
            }
        }
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let mut entries = self.lock();
        let target = resolve_parent(&entries, path);
        match entries.get(&target) {
            Some(MockEntry::File { .. }) | Some(MockEntry::Symlink(_)) => {
                entries.remove(&target);
                Ok(())
            }
            Some(MockEntry::Dir) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        let mut entries = self.lock();
        let target = resolve_parent(&entries, path);
        match entries.get(&target) {
            Some(MockEntry::Dir) if has_children(&entries, &target) => {
                Err(anyhow!("Directory not empty: {:?}", path))
            }
            Some(MockEntry::Dir) => {
                entries.remove(&target);
                Ok(())
            }
            Some(_) => Err(anyhow!("Not a directory: {:?}", path)),
            None => Err(anyhow!("Directory not found: {:?}", path)),
        }
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        let mut entries = self.lock();
        let target = resolve_parent(&entries, path);
        match entries.get(&target) {
            Some(MockEntry::Symlink(_)) => {
                entries.remove(&target);
                Ok(())
            }
            Some(MockEntry::Dir) => {
                entries.retain(|k, _| !k.starts_with(&target));
                Ok(())
            }
            Some(MockEntry::File { .. }) => Err(anyhow!("Not a directory: {:?}", path)),
            None => Err(anyhow!("Directory not found: {:?}", path)),
        }
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        let mut entries = self.lock();
        let content = match entries.get(&resolve(&entries, from)) {
            Some(MockEntry::File { content, .. }) => content.clone(),
            Some(_) => bail!("Not a file: {:?}", from),
            None => bail!("File not found: {:?}", from),
        };
        let target = resolve(&entries, to);
        if !parent_is_dir(&entries, &target) {
            bail!("Parent directory missing: {:?}", to);
        }
        if matches!(entries.get(&target), Some(MockEntry::Dir)) {
            bail!("Is a directory: {:?}", to);
        }
        entries.insert(
            target,
            MockEntry::File {
                content,
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        let mut entries = self.lock();
        let link_path = resolve_parent(&entries, link);
        if entries.contains_key(&link_path) {
            bail!("Already exists: {:?}", link);
        }
        if !parent_is_dir(&entries, &link_path) {
            bail!("Parent directory missing: {:?}", link);
        }
        entries.insert(link_path, MockEntry::Symlink(target.to_path_buf()));
        Ok(())
    }

    fn read_link(&self, path: &Path) -> Result<PathBuf> {
        let entries = self.lock();
        match entries.get(&resolve_parent(&entries, path)) {
            Some(MockEntry::Symlink(target)) => Ok(target.clone()),
            Some(_) => Err(anyhow!("Not a symlink: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let mut entries = self.lock();
        let source = resolve_parent(&entries, from);
        let dest = resolve_parent(&entries, to);

        let Some(source_entry) = entries.get(&source).cloned() else {
            bail!("File not found: {:?}", from);
        };
        if !parent_is_dir(&entries, &dest) {
            bail!("Parent directory missing: {:?}", to);
        }
        match entries.get(&dest) {
            Some(MockEntry::Dir) if source_entry != MockEntry::Dir => {
                bail!("Is a directory: {:?}", to);
            }
            Some(MockEntry::Dir) if has_children(&entries, &dest) => {
                bail!("Directory not empty: {:?}", to);
            }
            _ => {}
        }

        entries.remove(&dest);
        let moved: Vec<(PathBuf, MockEntry)> = entries
            .iter()
            .filter(|(k, _)| k.starts_with(&source))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (old_path, entry) in moved {
            entries.remove(&old_path);
            let suffix = old_path.strip_prefix(&source).unwrap_or(Path::new(""));
            let new_path = if suffix.as_os_str().is_empty() {
                dest.clone()
            } else {
                dest.join(suffix)
            };
            entries.insert(new_path, entry);
        }
        Ok(())
    }

    fn make_unique_dir(&self, parent: &Path, prefix: &str) -> Result<PathBuf> {
        let mut entries = self.lock();
        let resolved_parent = resolve(&entries, parent);
        if !matches!(entries.get(&resolved_parent), Some(MockEntry::Dir)) {
            bail!("Not a directory or not found: {:?}", parent);
        }
        loop {
            let n = self.next_unique.fetch_add(1, Ordering::Relaxed) + 1;
            let name = format!("{prefix}{n:06}");
            let candidate = resolved_parent.join(&name);
            if !entries.contains_key(&candidate) {
                entries.insert(candidate, MockEntry::Dir);
                return Ok(parent.join(name));
            }
        }
    }
}
