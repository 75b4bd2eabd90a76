// copyguard-core/src/domain/quality/registry.rs

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use validator::Validate;

use crate::domain::error::DomainError;
use crate::domain::quality::detection::Detection;
use crate::domain::quality::lexicon::{ABBREVIATIONS, Lexicons};
use crate::domain::quality::policy::{DEFAULT_CUTOFF, ModulePolicy};
use crate::domain::quality::rule::{RuleSpec, WILDCARD_MODULE};
use crate::domain::quality::sentence::SentenceSplitter;

const BUILTIN_REGISTRY: &str = include_str!("../../../assets/default_registry.yaml");

/// Declarative registry: what a YAML rule pack contains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub lexicons: Lexicons,
    #[serde(default)]
    pub policies: BTreeMap<String, ModulePolicy>,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

impl RegistryConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, DomainError> {
        serde_yaml::from_str(content).map_err(|e| DomainError::RegistryError(e.to_string()))
    }

    pub fn builtin() -> Result<Self, DomainError> {
        Self::from_yaml_str(BUILTIN_REGISTRY)
    }

    /// Layers a rule pack on top of this one: lexicons are extended, policies overridden,
    /// rules appended. Duplicate ids surface later, at compile time.
    pub fn merge(&mut self, other: RegistryConfig) {
        self.lexicons.extend(other.lexicons);
        self.policies.extend(other.policies);
        self.rules.extend(other.rules);
    }
}

/// A rule with its detection compiled.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub spec: RuleSpec,
    pub detection: Detection,
}

impl CompiledRule {
    pub fn applies_to(&self, module_key: &str, intent: Option<&str>) -> bool {
        let module_match = self
            .spec
            .modules
            .iter()
            .any(|m| m == WILDCARD_MODULE || m == module_key);
        if !module_match {
            return false;
        }
        match (&self.spec.target_intents, intent) {
            (None, _) => true,
            (Some(targets), Some(intent)) => targets.iter().any(|t| t == intent),
            (Some(_), None) => false,
        }
    }
}

/// Immutable, compiled registry. Built once at startup and shared by reference.
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    rules: Vec<CompiledRule>,
    policies: BTreeMap<String, ModulePolicy>,
    lexicons: Lexicons,
    splitter: SentenceSplitter,
    default_cutoff: i32,
}

impl RuleRegistry {
    /// Validates and compiles every rule. A malformed rule is a configuration bug:
    /// the whole registry is rejected, nothing is skipped.
    pub fn compile(config: RegistryConfig) -> Result<Self, DomainError> {
        let mut seen = HashSet::with_capacity(config.rules.len());
        let mut rules = Vec::with_capacity(config.rules.len());

        for spec in config.rules {
            spec.validate().map_err(|e| DomainError::InvalidRule {
                rule_id: spec.id.clone(),
                reason: e.to_string(),
            })?;

            if !seen.insert(spec.id.clone()) {
                return Err(DomainError::DuplicateRule(spec.id));
            }

            if spec
                .target_intents
                .as_ref()
                .is_some_and(|t| t.is_empty() || t.iter().any(|i| i.trim().is_empty()))
            {
                return Err(DomainError::InvalidRule {
                    rule_id: spec.id,
                    reason: "target_intents must list non-empty intents (omit it to match any intent)"
                        .to_string(),
                });
            }

            let detection = Detection::compile(&spec.detection, &spec.id, &config.lexicons)?;
            rules.push(CompiledRule { spec, detection });
        }

        for (module, policy) in &config.policies {
            policy.validate().map_err(|e| DomainError::InvalidPolicy {
                module: module.clone(),
                reason: e.to_string(),
            })?;
        }

        let splitter = match config.lexicons.get(ABBREVIATIONS) {
            Some(words) => SentenceSplitter::new(words),
            None => SentenceSplitter::default(),
        };

        Ok(Self {
            rules,
            policies: config.policies,
            lexicons: config.lexicons,
            splitter,
            default_cutoff: DEFAULT_CUTOFF,
        })
    }

    /// The embedded default registry (Korean marketing lexicons and rules).
    pub fn builtin() -> Result<Self, DomainError> {
        Self::compile(RegistryConfig::builtin()?)
    }

    pub fn with_default_cutoff(mut self, cutoff: i32) -> Self {
        self.default_cutoff = cutoff;
        self
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn rule(&self, id: &str) -> Option<&CompiledRule> {
        self.rules.iter().find(|r| r.spec.id == id)
    }

    pub fn applicable<'a>(
        &'a self,
        module_key: &'a str,
        intent: Option<&'a str>,
    ) -> impl Iterator<Item = &'a CompiledRule> + 'a {
        self.rules
            .iter()
            .filter(move |r| r.applies_to(module_key, intent))
    }

    pub fn policy(&self, module_key: &str) -> Option<&ModulePolicy> {
        self.policies.get(module_key)
    }

    pub fn policies(&self) -> &BTreeMap<String, ModulePolicy> {
        &self.policies
    }

    pub fn cutoff_for(&self, module_key: &str) -> i32 {
        self.policy(module_key)
            .map_or(self.default_cutoff, |p| p.cutoff)
    }

    pub fn default_cutoff(&self) -> i32 {
        self.default_cutoff
    }

    pub fn lexicons(&self) -> &Lexicons {
        &self.lexicons
    }

    pub fn splitter(&self) -> &SentenceSplitter {
        &self.splitter
    }
}
