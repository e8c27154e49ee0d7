#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use athens_publish::config::{BuildSection, ConfigFile, RawConfigFile};
use athens_publish::exec::ToolRunner;
use athens_publish::fs::mock::MockFileSystem;
use athens_publish::fs::FileSystem;
use athens_publish::publish::{PublishLayout, Publisher};
use athens_publish::types::FailurePolicy;
use athens_publish::watch::{DumpMatcher, Watcher};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    /// Starts with an empty `[build.environment]` table and default tools.
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                build: Some(BuildSection {
                    environment: Some(BTreeMap::new()),
                }),
                ..RawConfigFile::default()
            },
        }
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        if let Some(env) = self
            .config
            .build
            .get_or_insert_with(BuildSection::default)
            .environment
            .as_mut()
        {
            env.insert(key.to_string(), value.to_string());
        }
        self
    }

    pub fn with_dump_pattern(mut self, pattern: &str) -> Self {
        self.config.pipeline.dump_pattern = pattern.to_string();
        self
    }

    pub fn with_stage_timeout(mut self, timeout: &str) -> Self {
        self.config.pipeline.stage_timeout = Some(timeout.to_string());
        self
    }

    pub fn on_failure(mut self, policy: FailurePolicy) -> Self {
        self.config.pipeline.on_failure = policy;
        self
    }

    pub fn with_zola(mut self, program: &str) -> Self {
        self.config.tools.zola = program.to_string();
        self
    }

    /// The unvalidated config, for tests that expect validation to fail.
    pub fn into_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A fixed "now" so ages are exact.
pub fn fixed_now() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

/// An in-memory deployment: dump directory, scratch and output roots, and a
/// site template checkout.
///
/// ```text
/// /srv/dumps/
/// /srv/tmp/
/// /srv/out/                      (created by the startup check)
/// /srv/athens-export/
/// /srv/obsidian-zola/zola/config.toml
/// /srv/obsidian-zola/zola/templates/page.html
/// /srv/obsidian-zola/content/_index.md
/// /srv/obsidian-zola/convert.py
/// /srv/obsidian-zola/utils.py
/// ```
pub struct MockSite {
    pub fs: MockFileSystem,
    pub layout: PublishLayout,
    pub input_dir: PathBuf,
    pub now: SystemTime,
}

impl MockSite {
    pub fn new() -> Self {
        let fs = MockFileSystem::new();
        let input_dir = PathBuf::from("/srv/dumps");
        let layout = PublishLayout::new(
            "/srv/tmp",
            "/srv/out",
            "/srv/athens-export",
            "/srv/obsidian-zola",
        );

        fs.add_dir(&input_dir);
        fs.add_dir(layout.temp_dir());
        fs.add_dir(layout.exporter_dir());
        fs.add_file("/srv/obsidian-zola/zola/config.toml", "base_url = \"/\"\n");
        fs.add_file("/srv/obsidian-zola/zola/templates/page.html", "{{ page.content }}");
        fs.add_file("/srv/obsidian-zola/content/_index.md", "+++\n+++\n");
        fs.add_file("/srv/obsidian-zola/convert.py", "print('convert')\n");
        fs.add_file("/srv/obsidian-zola/utils.py", "# utils\n");

        Self {
            fs,
            layout,
            input_dir,
            now: fixed_now(),
        }
    }

    /// Place a dump whose mtime is `age` before `self.now`.
    pub fn add_dump(&self, name: &str, age: Duration) -> PathBuf {
        let path = self.input_dir.join(name);
        self.fs
            .add_file_with_mtime(&path, "{\"datoms\": []}", self.now - age);
        path
    }

    pub fn shared_fs(&self) -> Arc<dyn FileSystem> {
        Arc::new(self.fs.clone())
    }

    pub fn watcher(&self, cfg: &ConfigFile, wait: Duration) -> Watcher {
        let matcher = DumpMatcher::new(cfg.dump_pattern()).expect("valid dump pattern");
        Watcher::new(self.shared_fs(), &self.input_dir, matcher, wait)
    }

    pub fn publisher<R: ToolRunner>(&self, runner: R, cfg: &ConfigFile) -> Publisher<R> {
        Publisher::new(self.shared_fs(), runner, self.layout.clone(), cfg)
    }

    /// Directories under the output root whose name starts with `public_tmp_`.
    pub fn output_dirs(&self) -> Vec<PathBuf> {
        self.fs
            .paths()
            .into_iter()
            .filter(|p| p.parent() == Some(self.layout.out_dir()))
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("public_tmp_"))
            })
            .collect()
    }

    /// Where `public` currently points, resolved against the output root.
    pub fn published_target(&self) -> Option<PathBuf> {
        let published = self.layout.published_path();
        self.fs
            .read_link(&published)
            .ok()
            .map(|target| self.layout.out_dir().join(target))
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.fs.exists(path.as_ref())
    }
}

impl Default for MockSite {
    fn default() -> Self {
        Self::new()
    }
}
