// src/publish/mod.rs

//! Turning a finalized dump into a published site.
//!
//! A publish cycle runs these stages in order, stopping at the first error:
//!
//! 1. `ClearingScratch`: recreate `<temp>/logseq`.
//! 2. `Exporting`: Athens dump → markdown tree.
//! 3. `PruningEmpty`: delete placeholder notes ([`prune`]).
//! 4. `StagingBuild`: assemble `<temp>/build` from the template ([`staging`]).
//! 5. `Converting`: obsidian-export, then the template's converter script.
//! 6. `GeneratingSite`: run the site generator into a fresh output directory.
//! 7. `SwappingSymlink`: atomically repoint `public` ([`swap`]).
//! 8. `PruningOldOutput`: delete previous output directories.
//!
//! Because the swap comes last, a failure anywhere leaves the currently
//! published site untouched.

pub mod commands;
pub mod layout;
pub mod prune;
pub mod staging;
pub mod swap;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info};

use crate::config::{ConfigFile, ToolsSection};
use crate::errors::{PublishError, Result};
use crate::exec::{ToolInvocation, ToolRunner};
use crate::fs::FileSystem;
use crate::types::PublishStage;

pub use layout::PublishLayout;

/// Summary of a successful publish cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedBuild {
    pub dump: PathBuf,
    /// Directory `public` now points at.
    pub output_dir: PathBuf,
    pub pruned_notes: Vec<PathBuf>,
    /// Previous output directories deleted after the swap.
    pub removed_outputs: Vec<PathBuf>,
}

/// Drives the external toolchain for one dump at a time.
pub struct Publisher<R: ToolRunner> {
    fs: Arc<dyn FileSystem>,
    runner: R,
    layout: PublishLayout,
    tools: ToolsSection,
    environment: BTreeMap<String, String>,
}

impl<R: ToolRunner> std::fmt::Debug for Publisher<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl<R: ToolRunner> Publisher<R> {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        runner: R,
        layout: PublishLayout,
        config: &ConfigFile,
    ) -> Self {
        Self {
            fs,
            runner,
            layout,
            tools: config.tools().clone(),
            environment: config.environment().clone(),
        }
    }

    pub fn layout(&self) -> &PublishLayout {
        &self.layout
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run a full publish cycle for `dump`.
    pub async fn publish(&mut self, dump: &Path) -> Result<PublishedBuild> {
        let fs = Arc::clone(&self.fs);
        let fs = fs.as_ref();
        let export_dir = self.layout.export_dir();
        let out_dir = self.layout.out_dir().to_path_buf();

        enter(PublishStage::ClearingScratch);
        staging::reset_dir(fs, &export_dir).context(PublishStage::ClearingScratch)?;

        enter(PublishStage::Exporting);
        self.run_tool(commands::athens_export(&self.tools, &self.layout, dump))
            .await?;

        enter(PublishStage::PruningEmpty);
        let pruned_notes = prune::remove_placeholder_notes(fs, &export_dir)
            .context(PublishStage::PruningEmpty)?;
        info!(count = pruned_notes.len(), "removed empty notes");

        enter(PublishStage::StagingBuild);
        staging::stage_build_dir(fs, &self.layout).context(PublishStage::StagingBuild)?;

        enter(PublishStage::Converting);
        self.run_tool(commands::obsidian_export(&self.tools, &self.layout))
            .await?;
        staging::copy_converter_scripts(fs, &self.layout, &self.tools)
            .context(PublishStage::Converting)?;
        self.run_tool(commands::converter(&self.tools, &self.layout, &self.environment))
            .await?;

        enter(PublishStage::GeneratingSite);
        let output_dir =
            swap::reserve_output_dir(fs, &out_dir).context(PublishStage::GeneratingSite)?;
        self.run_tool(commands::site_generator(&self.tools, &self.layout, &output_dir))
            .await?;
        if !fs.is_dir(&output_dir) {
            return Err(PublishError::MissingOutput {
                stage: PublishStage::GeneratingSite,
                path: output_dir,
            });
        }

        enter(PublishStage::SwappingSymlink);
        swap::swap_published_link(fs, &self.layout, &output_dir)
            .context(PublishStage::SwappingSymlink)?;

        enter(PublishStage::PruningOldOutput);
        let removed_outputs = swap::collect_garbage(fs, &out_dir, &output_dir)
            .context(PublishStage::PruningOldOutput)?;

        Ok(PublishedBuild {
            dump: dump.to_path_buf(),
            output_dir,
            pruned_notes,
            removed_outputs,
        })
    }

    async fn run_tool(&mut self, invocation: ToolInvocation) -> Result<()> {
        self.runner.run(&invocation).await
    }
}

fn enter(stage: PublishStage) {
    debug!(stage = %stage, "entering stage");
}
