// copyguard/src/commands/mod.rs

pub mod evaluate;
pub mod gate;
pub mod rules;
pub mod sanitize;

use anyhow::Context;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use std::path::Path;

use copyguard_core::domain::ProjectConfig;
use copyguard_core::infrastructure::config::load_project_config_or_default;

/// Project file and satellites, or the built-in defaults when the directory has none.
pub fn load_config(project_dir: &Path) -> anyhow::Result<ProjectConfig> {
    load_project_config_or_default(project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {}",
            project_dir.display()
        )
    })
}

pub fn new_table<const N: usize>(header: [&str; N]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}
