// src/publish/commands.rs

//! Command lines of the external toolchain.

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::ToolsSection;
use crate::exec::ToolInvocation;
use crate::publish::layout::PublishLayout;
use crate::types::PublishStage;

/// Wrap a path in double quotes so the exporter reads it as an EDN string.
fn edn_string(path: &Path) -> String {
    format!("\"{}\"", path.display())
}

/// `clojure -X athens.export/export :athens "<dump>" :logseq "<export dir>"`
pub fn athens_export(tools: &ToolsSection, layout: &PublishLayout, dump: &Path) -> ToolInvocation {
    let export_dir = layout.export_dir();
    ToolInvocation::new(PublishStage::Exporting, &tools.clojure)
        .arg("-X")
        .arg(&tools.export_function)
        .arg(":athens")
        .arg(edn_string(dump))
        .arg(":logseq")
        .arg(edn_string(&export_dir))
        .current_dir(layout.exporter_dir())
        .output(export_dir)
}

/// obsidian-export from the pruned export tree into `<build>/__docs`.
pub fn obsidian_export(tools: &ToolsSection, layout: &PublishLayout) -> ToolInvocation {
    let converted = layout.converted_dir();
    ToolInvocation::new(PublishStage::Converting, &tools.obsidian_export)
        .arg("--frontmatter=never")
        .arg("--hard-linebreaks")
        .arg("--no-recursive-embeds")
        .arg(layout.export_dir())
        .arg(&converted)
        .output(converted)
}

/// The template's converter script, run from the scratch root with the
/// `[build.environment]` variables.
pub fn converter(
    tools: &ToolsSection,
    layout: &PublishLayout,
    environment: &BTreeMap<String, String>,
) -> ToolInvocation {
    ToolInvocation::new(PublishStage::Converting, &tools.python)
        .arg(tools.converter_entrypoint())
        .current_dir(layout.temp_dir())
        .envs(environment)
}

/// `zola --root <build> build -o <output>`; `output` must not exist yet.
pub fn site_generator(tools: &ToolsSection, layout: &PublishLayout, output: &Path) -> ToolInvocation {
    ToolInvocation::new(PublishStage::GeneratingSite, &tools.zola)
        .arg("--root")
        .arg(layout.build_dir())
        .arg("build")
        .arg("-o")
        .arg(output)
        .output(output)
}
