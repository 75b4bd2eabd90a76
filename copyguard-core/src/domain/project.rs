// copyguard-core/src/domain/project.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::brochure::document::ClaimPolicy;
use crate::domain::brochure::gate::GateConfig;
use crate::domain::error::DomainError;
use crate::domain::quality::policy::DEFAULT_CUTOFF;
use crate::domain::quality::registry::{RegistryConfig, RuleRegistry};
use crate::domain::slots::spec::{ModuleCatalog, ModuleSpec};

/// `quality:` block of the project file.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Validate)]
pub struct QualitySettings {
    #[serde(default = "default_cutoff")]
    #[validate(range(min = 0, max = 100, message = "default_cutoff must lie in 0..=100"))]
    pub default_cutoff: i32,

    /// Floor for every reviewed document: `strict` here makes all documents strict.
    #[serde(default)]
    pub claim_policy: ClaimPolicy,

    #[serde(flatten)]
    #[validate(nested)]
    pub gate: GateConfig,
}

impl Default for QualitySettings {
    fn default() -> Self {
        Self {
            default_cutoff: DEFAULT_CUTOFF,
            claim_policy: ClaimPolicy::default(),
            gate: GateConfig::default(),
        }
    }
}

fn default_cutoff() -> i32 {
    DEFAULT_CUTOFF
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ProjectConfig {
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(rename = "config-paths", default)]
    pub config_paths: Vec<String>,

    /// Drop the embedded registry and use only the project's rule packs.
    #[serde(rename = "replace-builtin-rules", default)]
    pub replace_builtin_rules: bool,

    #[serde(default)]
    #[validate(nested)]
    pub quality: QualitySettings,

    // --- Hydrated from satellite files ---
    #[serde(skip)]
    pub rule_packs: RegistryConfig,

    #[serde(skip)]
    pub modules: Vec<ModuleSpec>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "copyguard".to_string(),
            version: default_version(),
            config_paths: vec![],
            replace_builtin_rules: false,
            quality: QualitySettings::default(),
            rule_packs: RegistryConfig::default(),
            modules: vec![],
        }
    }
}

impl ProjectConfig {
    /// Built-in registry (unless replaced) with every project pack layered on top.
    pub fn registry_config(&self) -> Result<RegistryConfig, DomainError> {
        let mut config = if self.replace_builtin_rules {
            RegistryConfig::default()
        } else {
            RegistryConfig::builtin()?
        };
        config.merge(self.rule_packs.clone());
        Ok(config)
    }

    pub fn build_registry(&self) -> Result<RuleRegistry, DomainError> {
        Ok(RuleRegistry::compile(self.registry_config()?)?
            .with_default_cutoff(self.quality.default_cutoff))
    }

    /// Built-in modules, overridden or extended by the project's `modules.yml`.
    pub fn build_catalog(&self) -> Result<ModuleCatalog, DomainError> {
        let mut catalog = ModuleCatalog::builtin()?;
        for spec in &self.modules {
            catalog.insert(spec.clone())?;
        }
        Ok(catalog)
    }

    pub fn gate_config(&self) -> GateConfig {
        self.quality.gate.clone()
    }
}
