// copyguard/src/commands/sanitize.rs
//
// USE CASE: Turn a raw LLM reply into a well-formed module instance.

use anyhow::Context;
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

use copyguard_core::domain::slots::sanitizer::missing_required;
use copyguard_core::domain::slots::{ModuleInstance, SlotSanitizer};
use copyguard_core::infrastructure::extraction::extract_json_object;
use copyguard_core::infrastructure::fs::write_json;

use crate::commands::load_config;

pub fn execute(
    project_dir: PathBuf,
    module: String,
    input: PathBuf,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = load_config(&project_dir)?;
    let catalog = config.build_catalog()?;
    let spec = catalog.require(&module)?;

    let reply = fs::read_to_string(&input)
        .with_context(|| format!("Failed to read reply from {}", input.display()))?;
    let raw = extract_json_object(&reply).unwrap_or_else(|| {
        warn!(input = %input.display(), "No JSON object in reply, sanitizing an empty one");
        Value::Object(Map::new())
    });

    let sanitizer = SlotSanitizer::new()?;
    let instance = ModuleInstance {
        module_id: spec.id.clone(),
        slots: sanitizer.sanitize_generated(spec, &raw),
    };

    for key in missing_required(spec, &instance.slots) {
        eprintln!("⚠️  Required slot '{}' is empty", key);
    }

    match output {
        Some(path) => {
            write_json(&path, &instance)?;
            println!("✨ Sanitized '{}' written to {}", spec.id, path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&instance)?),
    }
    Ok(())
}
