use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// What to do when publishing a dump fails.
///
/// - `Abort`: propagate the error and terminate the process (default).
/// - `Skip`: log the error and remember the dump as processed, so it is not
///   retried until a newer dump shows up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    #[default]
    Abort,
    Skip,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "skip" => Ok(FailurePolicy::Skip),
            other => Err(format!(
                "invalid on_failure: {other} (expected \"abort\" or \"skip\")"
            )),
        }
    }
}

/// Stages of a single publish cycle, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PublishStage {
    ClearingScratch,
    Exporting,
    PruningEmpty,
    StagingBuild,
    Converting,
    GeneratingSite,
    SwappingSymlink,
    PruningOldOutput,
}

impl PublishStage {
    pub const ALL: [PublishStage; 8] = [
        PublishStage::ClearingScratch,
        PublishStage::Exporting,
        PublishStage::PruningEmpty,
        PublishStage::StagingBuild,
        PublishStage::Converting,
        PublishStage::GeneratingSite,
        PublishStage::SwappingSymlink,
        PublishStage::PruningOldOutput,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PublishStage::ClearingScratch => "clearing_scratch",
            PublishStage::Exporting => "exporting",
            PublishStage::PruningEmpty => "pruning_empty",
            PublishStage::StagingBuild => "staging_build",
            PublishStage::Converting => "converting",
            PublishStage::GeneratingSite => "generating_site",
            PublishStage::SwappingSymlink => "swapping_symlink",
            PublishStage::PruningOldOutput => "pruning_old_output",
        }
    }
}

impl fmt::Display for PublishStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
