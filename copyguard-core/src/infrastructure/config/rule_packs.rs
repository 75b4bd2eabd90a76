// copyguard-core/src/infrastructure/config/rule_packs.rs

use std::path::{Path, PathBuf};
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::domain::quality::registry::RegistryConfig;
use crate::infrastructure::config::project::load_fragment;
use crate::infrastructure::error::InfrastructureError;

/// Every `*.yml` / `*.yaml` file under `dir`, recursively, in path order.
pub fn discover_rule_packs(dir: &Path) -> Result<Vec<PathBuf>, InfrastructureError> {
    let mut packs = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| InfrastructureError::ConfigError(e.to_string()))?;
        let is_yaml = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yml") || e.eq_ignore_ascii_case("yaml"));
        if entry.file_type().is_file() && is_yaml {
            packs.push(entry.into_path());
        }
    }
    // Tri déterministe: packs merge in the same order on every machine
    packs.sort();
    Ok(packs)
}

/// Merges every rule pack found under `dir` into one registry fragment.
#[instrument(skip(dir), fields(path = %dir.display()))]
pub fn load_rule_packs(dir: &Path) -> Result<RegistryConfig, InfrastructureError> {
    let mut merged = RegistryConfig::default();
    for path in discover_rule_packs(dir)? {
        let pack: RegistryConfig = load_fragment(&path)?;
        debug!(
            path = %path.display(),
            rules = pack.rules.len(),
            policies = pack.policies.len(),
            "Rule pack loaded"
        );
        merged.merge(pack);
    }
    Ok(merged)
}
