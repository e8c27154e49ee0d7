// src/publish/layout.rs

use std::path::{Path, PathBuf};

use crate::cli::CliArgs;

/// Name of the published symlink inside the output root.
pub const PUBLISHED_NAME: &str = "public";

/// Prefix of the uniquely-named build output directories.
pub const OUTPUT_PREFIX: &str = "public_tmp_";

/// Suffix of the transient symlink that is renamed onto `public`.
pub const LINK_SUFFIX: &str = ".link";

/// Every path the publisher reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishLayout {
    temp_dir: PathBuf,
    out_dir: PathBuf,
    exporter_dir: PathBuf,
    template_dir: PathBuf,
}

impl PublishLayout {
    pub fn new(
        temp_dir: impl Into<PathBuf>,
        out_dir: impl Into<PathBuf>,
        exporter_dir: impl Into<PathBuf>,
        template_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            out_dir: out_dir.into(),
            exporter_dir: exporter_dir.into(),
            template_dir: template_dir.into(),
        }
    }

    pub fn from_args(args: &CliArgs) -> Self {
        Self::new(
            &args.temp_dir,
            &args.out_dir,
            &args.athens_export,
            &args.obsidian_zola,
        )
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Working directory of the Athens exporter.
    pub fn exporter_dir(&self) -> &Path {
        &self.exporter_dir
    }

    /// Root of the site template checkout.
    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    /// Markdown tree written by the Athens exporter.
    pub fn export_dir(&self) -> PathBuf {
        self.temp_dir.join("logseq")
    }

    /// Site generator project assembled from the template.
    pub fn build_dir(&self) -> PathBuf {
        self.temp_dir.join("build")
    }

    pub fn content_dir(&self) -> PathBuf {
        self.build_dir().join("content")
    }

    pub fn docs_dir(&self) -> PathBuf {
        self.content_dir().join("docs")
    }

    /// Output of obsidian-export, input of the converter script.
    pub fn converted_dir(&self) -> PathBuf {
        self.build_dir().join("__docs")
    }

    pub fn template_scaffold(&self) -> PathBuf {
        self.template_dir.join("zola")
    }

    pub fn template_content(&self) -> PathBuf {
        self.template_dir.join("content")
    }

    pub fn published_path(&self) -> PathBuf {
        self.out_dir.join(PUBLISHED_NAME)
    }
}
