// copyguard-core/src/infrastructure/config/project.rs

use serde::{Deserialize, de::DeserializeOwned};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::domain::brochure::document::ClaimPolicy;
use crate::domain::project::ProjectConfig;
use crate::domain::quality::lexicon::Lexicons;
use crate::domain::quality::policy::ModulePolicy;
use crate::domain::slots::spec::ModuleSpec;
use crate::infrastructure::config::rule_packs::load_rule_packs;
use crate::infrastructure::error::InfrastructureError;

pub const CONFIG_CANDIDATES: [&str; 2] = ["copyguard_project_conf.yaml", "copyguard.yaml"];

pub const ENV_CLAIM_POLICY: &str = "COPYGUARD_CLAIM_POLICY";
pub const ENV_SIMILARITY_THRESHOLD: &str = "COPYGUARD_SIMILARITY_THRESHOLD";
pub const ENV_DEFAULT_CUTOFF: &str = "COPYGUARD_DEFAULT_CUTOFF";

// --- LOADER ---

#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    // 1. Main file discovery
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project manifest");

    // 2. Base YAML
    let mut config: ProjectConfig = load_fragment(&config_path)?;

    // 3. Satellites (fail-secure: a corrupt satellite stops everything)
    if let Some(config_folder) = config.config_paths.first() {
        let config_dir = project_dir.join(config_folder);
        if config_dir.exists() {
            load_satellite_configs(&mut config, &config_dir)?;
        } else {
            warn!(dir = ?config_dir, "Config path declared but missing");
        }
    }

    // 4. Environment layering, e.g. COPYGUARD_CLAIM_POLICY=strict copyguard gate ...
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    config
        .validate()
        .map_err(|e| InfrastructureError::ConfigError(e.to_string()))?;
    Ok(config)
}

/// Like [`load_project_config`], but a directory without a project file yields the defaults.
/// Any other error (unreadable or invalid files) still propagates.
pub fn load_project_config_or_default(
    project_dir: &Path,
) -> Result<ProjectConfig, InfrastructureError> {
    match load_project_config(project_dir) {
        Err(InfrastructureError::ConfigNotFound(reason)) => {
            info!(%reason, "No project file, using built-in defaults");
            let mut config = ProjectConfig::default();
            apply_env_overrides(&mut config, |key| std::env::var(key).ok());
            Ok(config)
        }
        other => other,
    }
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in CONFIG_CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, CONFIG_CANDIDATES
    )))
}

// --- GENERIC LOGIC ---

/// Loads a typed configuration fragment. `T` is the wrapper struct expected in the file.
pub(crate) fn load_fragment<T: DeserializeOwned>(path: &Path) -> Result<T, InfrastructureError> {
    let content = fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|source| InfrastructureError::YamlError {
        path: path.display().to_string(),
        source,
    })
}

fn load_satellite_configs(
    config: &mut ProjectConfig,
    config_dir: &Path,
) -> Result<(), InfrastructureError> {
    // A. Lexicons
    let lex_path = config_dir.join("lexicons.yml");
    if lex_path.exists() {
        #[derive(Deserialize)]
        struct LexiconsWrapper {
            lexicons: Lexicons,
        }

        let wrapper: LexiconsWrapper = load_fragment(&lex_path)?;
        config.rule_packs.lexicons.extend(wrapper.lexicons);
        info!("  📚 Lexicons loaded");
    }

    // B. Module policies
    let pol_path = config_dir.join("policies.yml");
    if pol_path.exists() {
        #[derive(Deserialize)]
        struct PoliciesWrapper {
            policies: BTreeMap<String, ModulePolicy>,
        }

        let wrapper: PoliciesWrapper = load_fragment(&pol_path)?;
        config.rule_packs.policies.extend(wrapper.policies);
        info!("  🎯 Module policies loaded");
    }

    // C. Module catalog
    let mod_path = config_dir.join("modules.yml");
    if mod_path.exists() {
        #[derive(Deserialize)]
        struct ModulesWrapper {
            modules: Vec<ModuleSpec>,
        }

        let wrapper: ModulesWrapper = load_fragment(&mod_path)?;
        info!(count = wrapper.modules.len(), "  🧩 Module specs loaded");
        config.modules.extend(wrapper.modules);
    }

    // D. Rule packs
    let rules_dir = config_dir.join("rules");
    if rules_dir.is_dir() {
        let packs = load_rule_packs(&rules_dir)?;
        info!(rules = packs.rules.len(), "  📏 Rule packs loaded");
        config.rule_packs.merge(packs);
    }

    Ok(())
}

/// Overrides quality settings from environment-style variables.
/// `lookup` is `std::env::var` in production; unparsable values are ignored with a warning.
pub fn apply_env_overrides<F>(config: &mut ProjectConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup(ENV_CLAIM_POLICY) {
        match val.parse::<ClaimPolicy>() {
            Ok(policy) => {
                info!(old = %config.quality.claim_policy, new = %policy, "Overriding claim policy via ENV");
                config.quality.claim_policy = policy;
            }
            Err(e) => warn!(value = %val, error = %e, "Ignoring {}", ENV_CLAIM_POLICY),
        }
    }
    if let Some(val) = lookup(ENV_SIMILARITY_THRESHOLD) {
        match val.trim().parse::<f64>() {
            Ok(threshold) => {
                info!(old = config.quality.gate.similarity_threshold, new = threshold, "Overriding similarity threshold via ENV");
                config.quality.gate.similarity_threshold = threshold;
            }
            Err(e) => warn!(value = %val, error = %e, "Ignoring {}", ENV_SIMILARITY_THRESHOLD),
        }
    }
    if let Some(val) = lookup(ENV_DEFAULT_CUTOFF) {
        match val.trim().parse::<i32>() {
            Ok(cutoff) => {
                info!(old = config.quality.default_cutoff, new = cutoff, "Overriding default cutoff via ENV");
                config.quality.default_cutoff = cutoff;
            }
            Err(e) => warn!(value = %val, error = %e, "Ignoring {}", ENV_DEFAULT_CUTOFF),
        }
    }
}
