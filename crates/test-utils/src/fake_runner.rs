use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use athens_publish::errors::{PublishError, Result};
use athens_publish::exec::{ToolInvocation, ToolRunner};
use athens_publish::fs::FileSystem;
use athens_publish::types::PublishStage;

/// A fake tool runner that:
/// - records every invocation
/// - simulates what each tool writes, through the shared `FileSystem`
/// - optionally fails every invocation of one stage.
///
/// Clones share the invocation log and the failure switch, so a test can keep
/// one clone while the publisher owns another.
///
/// Like the real site generator, the fake refuses an output directory that
/// already exists.
#[derive(Debug, Clone)]
pub struct FakeToolRunner {
    fs: Arc<dyn FileSystem>,
    invocations: Arc<Mutex<Vec<ToolInvocation>>>,
    exported_notes: Vec<(String, String)>,
    fail_stage: Arc<Mutex<Option<PublishStage>>>,
    site_output: bool,
}

impl FakeToolRunner {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            invocations: Arc::new(Mutex::new(Vec::new())),
            exported_notes: Vec::new(),
            fail_stage: Arc::new(Mutex::new(None)),
            site_output: true,
        }
    }

    /// Note written by the fake exporter, relative to the export directory.
    pub fn with_note(mut self, rel_path: &str, content: &str) -> Self {
        self.exported_notes
            .push((rel_path.to_string(), content.to_string()));
        self
    }

    /// Make every tool of `stage` exit with status 1.
    pub fn failing_at(self, stage: PublishStage) -> Self {
        self.set_fail_stage(Some(stage));
        self
    }

    /// Toggle failure injection, also for clones already handed out.
    pub fn set_fail_stage(&self, stage: Option<PublishStage>) {
        *self.fail_stage.lock().unwrap() = stage;
    }

    /// The fake site generator exits successfully without writing anything.
    pub fn without_site_output(mut self) -> Self {
        self.site_output = false;
        self
    }

    pub fn invocations(&self) -> Vec<ToolInvocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn stages(&self) -> Vec<PublishStage> {
        self.invocations().iter().map(|i| i.stage).collect()
    }

    pub fn programs(&self) -> Vec<String> {
        self.invocations().iter().map(|i| i.program.clone()).collect()
    }

    fn simulate(&self, invocation: &ToolInvocation) -> Result<()> {
        let Some(output) = invocation.output.as_deref() else {
            return Ok(());
        };
        match invocation.stage {
            PublishStage::Exporting => {
                for (rel, content) in &self.exported_notes {
                    self.fs.write(&output.join(rel), content.as_bytes())?;
                }
            }
            PublishStage::Converting => {
                self.fs.write(&output.join("index.md"), b"# converted\n")?;
            }
            PublishStage::GeneratingSite => self.generate_site(output)?,
            _ => {}
        }
        Ok(())
    }

    fn generate_site(&self, output: &Path) -> Result<()> {
        if self.fs.exists(output) {
            return Err(PublishError::Other(anyhow!(
                "output directory {:?} already exists",
                output
            )));
        }
        if self.site_output {
            self.fs.create_dir(output)?;
            self.fs
                .write(&output.join("index.html"), b"<html>site</html>")?;
        }
        Ok(())
    }
}

impl ToolRunner for FakeToolRunner {
    fn run<'a>(
        &'a mut self,
        invocation: &'a ToolInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            {
                let mut guard = self.invocations.lock().unwrap();
                guard.push(invocation.clone());
            }

            let fail_stage = *self.fail_stage.lock().unwrap();
            if fail_stage == Some(invocation.stage) {
                return Err(PublishError::ToolFailed {
                    stage: invocation.stage,
                    program: invocation.program.clone(),
                    code: Some(1),
                });
            }

            self.simulate(invocation)
        })
    }
}
